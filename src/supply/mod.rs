//! Dispatchable and weather-driven generation fleets (spec §4.5).

mod chp;
mod hydro_reservoir;
mod interconnector;
mod nuclear;
mod peakers;
mod run_of_river;
mod solar_fleet;
mod wind_fleet;

pub use chp::{ChpConfig, ChpFleet};
pub use hydro_reservoir::{HydroReservoirConfig, HydroReservoirFleet};
pub use interconnector::{InterconnectorConfig, InterconnectorFleet, InterconnectorMode};
pub use nuclear::{NuclearConfig, NuclearDispatchMode, NuclearFleet};
pub use peakers::{PeakersConfig, PeakersFleet};
pub use run_of_river::{RunOfRiverConfig, RunOfRiverFleet};
pub use solar_fleet::{SolarFleet, SolarFleetConfig};
pub use wind_fleet::{WindFleet, WindFleetConfig};

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupplyConfig {
    pub nuclear: NuclearConfig,
    pub hydro_reservoir: HydroReservoirConfig,
    pub run_of_river: RunOfRiverConfig,
    pub wind: WindFleetConfig,
    pub solar: SolarFleetConfig,
    pub chp: ChpConfig,
    pub peakers: PeakersConfig,
    pub interconnector: InterconnectorConfig,
}

#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub struct SupplyBreakdown {
    pub nuclear_mw: f32,
    pub hydro_reservoir_mw: f32,
    pub run_of_river_mw: f32,
    pub wind_mw: f32,
    pub solar_mw: f32,
    pub chp_mw: f32,
    pub peakers_mw: f32,
    pub net_import_mw: f32,
}

impl SupplyBreakdown {
    pub fn total_mw(self) -> f32 {
        self.nuclear_mw
            + self.hydro_reservoir_mw
            + self.run_of_river_mw
            + self.wind_mw
            + self.solar_mw
            + self.chp_mw
            + self.peakers_mw
            + self.net_import_mw
    }

    /// Generation the dispatcher treats as non-curtailable (spec §9 Open
    /// Question 1: industrial CHP is heat-led and counted here).
    pub fn must_take_mw(self) -> f32 {
        self.wind_mw + self.solar_mw + self.run_of_river_mw + self.chp_mw + self.nuclear_mw
    }
}

/// Ramp-limits `current` toward `target` by at most `ramp_per_s * dt_s`.
pub(crate) fn ramp_toward(current: f32, target: f32, ramp_per_s: f32, dt_s: f32) -> f32 {
    let max_step = ramp_per_s * dt_s;
    let delta = (target - current).clamp(-max_step, max_step);
    current + delta
}
