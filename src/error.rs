//! Error kinds for the simulator core (§7: load/config errors are fatal at
//! initialization; numeric bounds are handled locally by clamping).

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error returned from fallible, non-tick entry points.
///
/// Per-tick numeric sanitisation never produces an error — see
/// [`crate::world::World::last_numeric_bound_warnings`] for the diagnostic
/// trail of clamped inputs instead.
#[derive(Debug, Error)]
pub enum GridError {
    /// A replay CSV was malformed or missing a required column/row.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Configuration was structurally invalid (bad TOML, unknown id, size mismatch).
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Historical-replay source failed to load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file itself could not be read.
    #[error("cannot read replay file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A required column was absent from a replay CSV.
    #[error("{file}: missing required column \"{column}\"")]
    MissingColumn { file: &'static str, column: &'static str },
    /// A required row (time bucket) was absent and has no previous value to carry forward.
    #[error("{file}: missing row for time {time} with no prior value to carry forward")]
    MissingRow { file: &'static str, time: String },
    /// A cell failed to parse as its expected numeric type.
    #[error("{file}: cell \"{value}\" in column \"{column}\" is not a valid number")]
    BadCell {
        file: &'static str,
        column: &'static str,
        value: String,
    },
}

/// Configuration was invalid at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML document failed to parse or validate.
    #[error("config error: {field} — {message}")]
    Invalid { field: String, message: String },
    /// A bid or unit id referenced by a setter does not exist in the fleet.
    #[error("unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: usize },
    /// A persisted BESS fleet configuration disagreed in length with the live fleet.
    #[error("fleet size mismatch: expected {expected} units, got {got}")]
    FleetSizeMismatch { expected: usize, got: usize },
}

/// Result alias for fallible initialization paths.
pub type GridResult<T> = Result<T, GridError>;
