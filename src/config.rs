//! TOML-based top-level configuration and preset definitions.
//!
//! Wraps [`crate::world::WorldConfig`] (itself `#[serde(default)]` down to
//! every leaf field) with file/string loading and named presets, following
//! the load-then-validate shape of the original scenario loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::world::WorldConfig;

/// Loads a [`WorldConfig`] from a TOML file.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read or the TOML is
/// invalid or contains unknown fields.
pub fn from_toml_file(path: &Path) -> Result<WorldConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
        field: "config".to_string(),
        message: format!("cannot read \"{}\": {e}", path.display()),
    })?;
    from_toml_str(&content)
}

/// Parses a [`WorldConfig`] from a TOML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
pub fn from_toml_str(s: &str) -> Result<WorldConfig, ConfigError> {
    toml::from_str(s).map_err(|e| ConfigError::Invalid {
        field: "toml".to_string(),
        message: e.to_string(),
    })
}

/// Available preset names.
pub const PRESETS: &[&str] = &["baseline", "high_wind", "tight_reserves"];

/// Loads a named built-in preset.
///
/// # Errors
///
/// Returns a `ConfigError` if the preset name is unknown.
pub fn from_preset(name: &str) -> Result<WorldConfig, ConfigError> {
    match name {
        "baseline" => Ok(baseline()),
        "high_wind" => Ok(high_wind()),
        "tight_reserves" => Ok(tight_reserves()),
        _ => Err(ConfigError::Invalid {
            field: "preset".to_string(),
            message: format!("unknown preset \"{name}\", available: {}", PRESETS.join(", ")),
        }),
    }
}

/// The default configuration: every field at its built-in default.
pub fn baseline() -> WorldConfig {
    WorldConfig::default()
}

/// High-wind-penetration preset: larger wind fleet, smaller thermal peaker
/// capacity so the dispatcher leans harder on wind and imports.
pub fn high_wind() -> WorldConfig {
    let mut cfg = WorldConfig::default();
    cfg.wind.installed_mw *= 1.6;
    cfg.peakers.capacity_mw *= 0.7;
    cfg
}

/// Tight-reserves preset: halved FCR-N droop cap and aFRR ramp limits, to
/// stress the frequency controllers harder under the same disturbances.
pub fn tight_reserves() -> WorldConfig {
    let mut cfg = WorldConfig::default();
    cfg.frequency.fcr_droop_cap_mw *= 0.5;
    cfg.afrr.ramp_up_mw_per_s *= 0.5;
    cfg.afrr.ramp_down_mw_per_s *= 0.5;
    cfg
}

/// Validates a loaded configuration and returns a list of errors.
///
/// Returns an empty vector if the configuration is structurally sound.
/// This checks cross-field constraints that `serde` cannot express
/// (ordering, non-negativity, `0.0..=1.0` fractions); per-field numeric
/// sanity beyond that is enforced at tick time by clamping (§7).
pub fn validate(cfg: &WorldConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !(1..=365).contains(&cfg.start_day_of_year) {
        errors.push(ConfigError::Invalid {
            field: "start_day_of_year".into(),
            message: "must be in 1..=365".into(),
        });
    }
    if cfg.warmup_hours < 0.0 {
        errors.push(ConfigError::Invalid {
            field: "warmup_hours".into(),
            message: "must be >= 0".into(),
        });
    }

    if cfg.nuclear.unit_capacity_mw <= 0.0 {
        errors.push(ConfigError::Invalid {
            field: "nuclear.unit_capacity_mw".into(),
            message: "must be > 0".into(),
        });
    }
    if !(0.0..=1.0).contains(&cfg.nuclear.min_stable_fraction) {
        errors.push(ConfigError::Invalid {
            field: "nuclear.min_stable_fraction".into(),
            message: "must be in [0.0, 1.0]".into(),
        });
    }
    if !(0.0..=1.0).contains(&cfg.nuclear.must_run_fraction) {
        errors.push(ConfigError::Invalid {
            field: "nuclear.must_run_fraction".into(),
            message: "must be in [0.0, 1.0]".into(),
        });
    }

    if cfg.hydro_reservoir.storage_capacity_mwh <= 0.0 {
        errors.push(ConfigError::Invalid {
            field: "hydro_reservoir.storage_capacity_mwh".into(),
            message: "must be > 0".into(),
        });
    }
    if !(0.0..=1.0).contains(&cfg.hydro_reservoir.reservoir_fraction_of_installed) {
        errors.push(ConfigError::Invalid {
            field: "hydro_reservoir.reservoir_fraction_of_installed".into(),
            message: "must be in [0.0, 1.0]".into(),
        });
    }

    // An empty `units` list is valid: the fleet falls back to a single
    // default unit (see `BessFleet::new`). Per-unit fields are checked
    // only for units the config actually specifies.
    for (i, unit) in cfg.bess.units.iter().enumerate() {
        if !(0.0..=1.0).contains(&unit.initial_soc01) {
            errors.push(ConfigError::Invalid {
                field: format!("bess.units[{i}].initial_soc01"),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if unit.capacity_mwh <= 0.0 {
            errors.push(ConfigError::Invalid {
                field: format!("bess.units[{i}].capacity_mwh"),
                message: "must be > 0".into(),
            });
        }
    }

    if cfg.settlement.imbalance_deadband_mw < 0.0 {
        errors.push(ConfigError::Invalid {
            field: "settlement.imbalance_deadband_mw".into(),
            message: "must be >= 0".into(),
        });
    }

    if cfg.frequency.inertia_min_s > cfg.frequency.inertia_max_s {
        errors.push(ConfigError::Invalid {
            field: "frequency.inertia_min_s".into(),
            message: "must be <= frequency.inertia_max_s".into(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_valid() {
        let cfg = baseline();
        let errors = validate(&cfg);
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_load_and_validate() {
        for name in PRESETS {
            let cfg = from_preset(name).unwrap_or_else(|e| panic!("preset \"{name}\" should load: {e}"));
            let errors = validate(&cfg);
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn unknown_preset_errors() {
        let err = from_preset("nonexistent");
        assert!(err.is_err());
    }

    #[test]
    fn high_wind_has_larger_wind_fleet() {
        let base = baseline();
        let hw = high_wind();
        assert!(hw.wind.installed_mw > base.wind.installed_mw);
    }

    #[test]
    fn tight_reserves_has_smaller_droop_cap() {
        let base = baseline();
        let tr = tight_reserves();
        assert!(tr.frequency.fcr_droop_cap_mw < base.frequency.fcr_droop_cap_mw);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
seed = 99
"#;
        let cfg = from_toml_str(toml).expect("partial TOML should parse");
        assert_eq!(cfg.seed, 99);
        assert_eq!(cfg.start_day_of_year, WorldConfig::default().start_day_of_year);
    }

    #[test]
    fn invalid_toml_unknown_field_errors() {
        let toml = r#"
bogus_field = true
"#;
        assert!(from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_bad_start_day() {
        let mut cfg = baseline();
        cfg.start_day_of_year = 0;
        let errors = validate(&cfg);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Invalid { field, .. } if field == "start_day_of_year")));
    }

    #[test]
    fn validation_catches_bad_soc() {
        let mut cfg = baseline();
        cfg.bess.units.push(crate::bess::BessUnitConfig {
            initial_soc01: 1.5,
            ..Default::default()
        });
        let errors = validate(&cfg);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Invalid { field, .. } if field == "bess.units[0].initial_soc01")));
    }
}
