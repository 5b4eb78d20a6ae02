//! Transport sector: rail traction (Gaussian commute peaks) plus EV charging
//! against a daily energy budget with smart-charging throttling (spec §4.4).

use serde::Deserialize;

use super::{gaussian_pulse, DemandContext};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    pub rail_peak_mw: f32,
    pub rail_base_mw: f32,
    pub ev_fleet_count: f32,
    pub avg_km_per_day: f32,
    pub kwh_per_km: f32,
    pub winter_penalty: f32,
    pub ev_charger_fleet_mw: f32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            rail_peak_mw: 1_400.0,
            rail_base_mw: 300.0,
            ev_fleet_count: 2_000_000.0,
            avg_km_per_day: 35.0,
            kwh_per_km: 0.18,
            winter_penalty: 1.25,
            ev_charger_fleet_mw: 12_000.0,
        }
    }
}

pub struct TransportModel {
    config: TransportConfig,
    remaining_budget_mwh: f32,
    last_day_seen: Option<u16>,
}

impl TransportModel {
    pub fn new(config: TransportConfig) -> Self {
        let initial_budget = daily_budget_mwh(&config, 10.0);
        Self {
            config,
            remaining_budget_mwh: initial_budget,
            last_day_seen: None,
        }
    }

    pub fn step(&mut self, ctx: &DemandContext) -> f32 {
        let day = ctx.clock.day_of_year();
        if self.last_day_seen != Some(day) {
            self.last_day_seen = Some(day);
            self.remaining_budget_mwh = daily_budget_mwh(&self.config, ctx.synoptic.temperature_c);
        }

        let hour_frac = ctx.clock.local_hour() as f32 + ctx.clock.local_minute() as f32 / 60.0;
        let rail_mw = self.config.rail_base_mw
            + self.config.rail_peak_mw * (gaussian_pulse(hour_frac, 7.5, 1.0) + gaussian_pulse(hour_frac, 17.0, 1.2)).min(1.0);

        let throttle = (1.0 - ctx.grid_stress01).clamp(0.0, 1.0).powf(1.6);
        let remaining_hours_today = (86_400 - ctx.clock.second_index() as i32).max(1) as f32 / 3600.0;
        let target_ev_mw = if self.remaining_budget_mwh > 0.0 {
            (self.remaining_budget_mwh / remaining_hours_today.max(0.25)).min(self.config.ev_charger_fleet_mw) * throttle
        } else {
            0.0
        };

        self.remaining_budget_mwh = (self.remaining_budget_mwh - target_ev_mw / 3600.0).max(0.0);

        ((rail_mw + target_ev_mw) * ctx.curtailment01).max(0.0)
    }
}

fn daily_budget_mwh(config: &TransportConfig, temperature_c: f32) -> f32 {
    let winter_factor = if temperature_c < 5.0 { config.winter_penalty } else { 1.0 };
    config.ev_fleet_count * config.avg_km_per_day * config.kwh_per_km * winter_factor / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::weather::SynopticState;

    fn synoptic() -> SynopticState {
        SynopticState {
            temperature_c: 3.0,
            front_offset_c: 0.0,
            wind_mps: 4.0,
            cloud_cover01: 0.3,
            is_snowing: false,
            snow_intensity_mmph: 0.0,
        }
    }

    #[test]
    fn grid_stress_throttles_ev_charging() {
        let clock = Clock::new(10);
        let mut relaxed = TransportModel::new(TransportConfig::default());
        let mut stressed = TransportModel::new(TransportConfig::default());
        let low_stress = relaxed.step(&DemandContext { clock: &clock, synoptic: &synoptic(), curtailment01: 1.0, grid_stress01: 0.0 });
        let high_stress = stressed.step(&DemandContext { clock: &clock, synoptic: &synoptic(), curtailment01: 1.0, grid_stress01: 0.9 });
        assert!(high_stress < low_stress);
    }

    #[test]
    fn budget_never_goes_negative() {
        let mut clock = Clock::new(10);
        let mut model = TransportModel::new(TransportConfig::default());
        for _ in 0..86_400 {
            model.step(&DemandContext { clock: &clock, synoptic: &synoptic(), curtailment01: 1.0, grid_stress01: 0.0 });
            assert!(model.remaining_budget_mwh >= 0.0);
            clock.advance();
        }
    }
}
