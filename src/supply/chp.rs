//! Heat-led combined heat & power: waste (must-run) and biofuel (can add
//! condensing output at low heat load) (spec §4.5).

use serde::Deserialize;

use super::ramp_toward;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChpConfig {
    pub waste_capacity_mw: f32,
    pub waste_must_run_fraction: f32,
    pub biofuel_capacity_mw: f32,
    pub biofuel_min_load_fraction: f32,
    pub biofuel_condensing_max_mw: f32,
    pub condensing_heat_load_threshold: f32,
    pub heat_to_power_ratio: f32,
    pub ramp_mw_per_s: f32,
}

impl Default for ChpConfig {
    fn default() -> Self {
        Self {
            waste_capacity_mw: 900.0,
            waste_must_run_fraction: 0.55,
            biofuel_capacity_mw: 500.0,
            biofuel_min_load_fraction: 0.20,
            biofuel_condensing_max_mw: 120.0,
            condensing_heat_load_threshold: 0.35,
            heat_to_power_ratio: 0.60,
            ramp_mw_per_s: 5.0,
        }
    }
}

pub struct ChpFleet {
    config: ChpConfig,
    waste_mw: f32,
    biofuel_mw: f32,
}

impl ChpFleet {
    pub fn new(config: ChpConfig) -> Self {
        let waste_mw = config.waste_capacity_mw * config.waste_must_run_fraction * config.heat_to_power_ratio;
        let biofuel_mw = config.biofuel_capacity_mw * config.biofuel_min_load_fraction * config.heat_to_power_ratio;
        Self { config, waste_mw, biofuel_mw }
    }

    pub fn total_mw(&self) -> f32 {
        self.waste_mw + self.biofuel_mw
    }

    /// `heat_load_fraction01` is the current district-heat demand as a
    /// fraction of combined heat capacity; it, not electricity demand,
    /// drives these units' output.
    pub fn step(&mut self, heat_load_fraction01: f32, dt_s: f32) -> f32 {
        let waste_heat_fraction = heat_load_fraction01.max(self.config.waste_must_run_fraction);
        let waste_electric_target = (self.config.waste_capacity_mw * waste_heat_fraction * self.config.heat_to_power_ratio)
            .min(self.config.waste_capacity_mw);

        let biofuel_heat_fraction = heat_load_fraction01.max(self.config.biofuel_min_load_fraction);
        let condensing_mw = if heat_load_fraction01 <= self.config.condensing_heat_load_threshold {
            self.config.biofuel_condensing_max_mw
        } else {
            0.0
        };
        let biofuel_electric_target = (self.config.biofuel_capacity_mw * biofuel_heat_fraction * self.config.heat_to_power_ratio
            + condensing_mw)
            .min(self.config.biofuel_capacity_mw);

        self.waste_mw = ramp_toward(self.waste_mw, waste_electric_target, self.config.ramp_mw_per_s, dt_s);
        self.biofuel_mw = ramp_toward(self.biofuel_mw, biofuel_electric_target, self.config.ramp_mw_per_s, dt_s);

        self.total_mw()
    }
}
