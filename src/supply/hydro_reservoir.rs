//! Aggregated hydro reservoir fleet, energy-budgeted (spec §4.5).

use serde::Deserialize;

use super::ramp_toward;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HydroReservoirConfig {
    pub installed_mw: f32,
    pub reservoir_fraction_of_installed: f32,
    pub storage_capacity_mwh: f32,
    pub turbine_efficiency: f32,
    pub must_run_min_mw: f32,
    pub ramp_mw_per_s: f32,
}

impl Default for HydroReservoirConfig {
    fn default() -> Self {
        Self {
            installed_mw: 16_200.0,
            reservoir_fraction_of_installed: 0.90,
            storage_capacity_mwh: 34_000_000.0,
            turbine_efficiency: 0.92,
            must_run_min_mw: 500.0,
            ramp_mw_per_s: 120.0,
        }
    }
}

impl HydroReservoirConfig {
    pub fn available_mw(&self) -> f32 {
        self.installed_mw * self.reservoir_fraction_of_installed
    }
}

pub struct HydroReservoirFleet {
    config: HydroReservoirConfig,
    reservoir_storage_mwh: f64,
    energy_budget_today_mwh: f64,
    current_mw: f32,
}

impl HydroReservoirFleet {
    pub fn new(config: HydroReservoirConfig) -> Self {
        let initial_storage = f64::from(config.storage_capacity_mwh) * 0.6;
        let must_run_min_mw = config.must_run_min_mw;
        Self {
            config,
            reservoir_storage_mwh: initial_storage,
            energy_budget_today_mwh: 0.0,
            current_mw: must_run_min_mw,
        }
    }

    pub fn reservoir_storage_mwh(&self) -> f32 {
        self.reservoir_storage_mwh as f32
    }

    pub fn current_mw(&self) -> f32 {
        self.current_mw
    }

    /// Called by the dispatcher at day boundary with the hour's share of the
    /// day's hydro energy budget (spec §4.6 step 5).
    pub fn set_hourly_budget_mwh(&mut self, budget_mwh: f32) {
        self.energy_budget_today_mwh = f64::from(budget_mwh).max(0.0);
    }

    pub fn energy_budget_mwh(&self) -> f32 {
        self.energy_budget_today_mwh as f32
    }

    /// Advances one tick: refills the budget and reservoir from `inflow_mw`,
    /// ramps toward a target clamped to `[mustRunMin, min(available, energy-limited)]`,
    /// then spends both the budget and the reservoir. Storage and budget are
    /// tracked in `f64` since per-tick deltas (kWh-scale) are far smaller
    /// than the whole-day reservoir (GWh-scale) an `f32` accumulator could
    /// represent.
    pub fn step(&mut self, target_mw: f32, inflow_mw: f32, remaining_day_s: f32, dt_s: f32) -> f32 {
        let dt = f64::from(dt_s);
        let inflow_mwh = f64::from(inflow_mw) * dt / 3600.0;
        self.energy_budget_today_mwh += inflow_mwh;
        self.reservoir_storage_mwh = (self.reservoir_storage_mwh + inflow_mwh).min(f64::from(self.config.storage_capacity_mwh));

        let denom = remaining_day_s.max(60.0);
        let energy_limited_mw = (self.energy_budget_today_mwh * 3600.0 / f64::from(denom)) as f32;
        let available_mw = self.config.available_mw().min((self.reservoir_storage_mwh * 3600.0 / f64::from(dt_s.max(1.0))) as f32);

        let clamped_target = target_mw.clamp(self.config.must_run_min_mw, available_mw.min(energy_limited_mw).max(self.config.must_run_min_mw));

        self.current_mw = ramp_toward(self.current_mw, clamped_target, self.config.ramp_mw_per_s, dt_s)
            .clamp(0.0, self.config.available_mw());

        let spend_mwh = f64::from(self.current_mw) * dt / 3600.0 / f64::from(self.config.turbine_efficiency);
        self.energy_budget_today_mwh = (self.energy_budget_today_mwh - spend_mwh).max(0.0);
        self.reservoir_storage_mwh = (self.reservoir_storage_mwh - spend_mwh).clamp(0.0, f64::from(self.config.storage_capacity_mwh));

        self.current_mw
    }
}
