//! Commercial/public services sector: occupancy-driven demand plus smoothed
//! service heating (spec §4.4).

use serde::Deserialize;

use super::{low_pass, DemandContext};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServicesConfig {
    pub base_mw: f32,
    pub occupied_peak_mw: f32,
    pub heating_design_mw: f32,
    pub heating_tau_s: f32,
    pub is_holiday: bool,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            base_mw: 3_000.0,
            occupied_peak_mw: 9_000.0,
            heating_design_mw: 4_000.0,
            heating_tau_s: 1800.0,
            is_holiday: false,
        }
    }
}

const WEEKDAY_OCCUPANCY: [f32; 24] = [
    0.05, 0.05, 0.05, 0.05, 0.08, 0.15, 0.35, 0.65, 0.90, 1.00, 1.00, 0.95, 0.90, 0.95, 1.00, 1.00,
    0.90, 0.65, 0.35, 0.20, 0.12, 0.08, 0.06, 0.05,
];
const WEEKEND_OCCUPANCY: [f32; 24] = [
    0.05, 0.05, 0.05, 0.05, 0.05, 0.08, 0.12, 0.20, 0.35, 0.50, 0.60, 0.65, 0.65, 0.60, 0.55, 0.50,
    0.45, 0.40, 0.30, 0.20, 0.15, 0.10, 0.08, 0.05,
];

pub struct ServicesModel {
    config: ServicesConfig,
    smoothed_heating_mw: f32,
}

impl ServicesModel {
    pub fn new(config: ServicesConfig) -> Self {
        Self { config, smoothed_heating_mw: 0.0 }
    }

    pub fn step(&mut self, ctx: &DemandContext) -> f32 {
        let hour = ctx.clock.local_hour() as usize;
        let day_index = ctx.clock.day_of_year() % 7;
        let is_weekend = day_index == 0 || day_index == 6;
        let occupancy = if is_weekend { WEEKEND_OCCUPANCY[hour] } else { WEEKDAY_OCCUPANCY[hour] };
        let holiday_factor = if self.config.is_holiday { 0.4 } else { 1.0 };
        let activity_mw = self.config.base_mw + (self.config.occupied_peak_mw - self.config.base_mw) * occupancy * holiday_factor;

        let heating_degree_factor = ((16.0 - ctx.synoptic.temperature_c) / 30.0).clamp(0.0, 1.0);
        let target_heating_mw = self.config.heating_design_mw * heating_degree_factor * occupancy.max(0.2);
        self.smoothed_heating_mw = low_pass(self.smoothed_heating_mw, target_heating_mw, self.config.heating_tau_s, 1.0);

        ((activity_mw + self.smoothed_heating_mw) * ctx.curtailment01).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::weather::SynopticState;

    fn synoptic() -> SynopticState {
        SynopticState {
            temperature_c: 2.0,
            front_offset_c: 0.0,
            wind_mps: 4.0,
            cloud_cover01: 0.3,
            is_snowing: false,
            snow_intensity_mmph: 0.0,
        }
    }

    #[test]
    fn occupied_hours_draw_more_than_closed_hours() {
        let mut clock_day = Clock::new(10);
        for _ in 0..11 * 3600 {
            clock_day.advance();
        }
        let clock_night = Clock::new(10);
        let mut model_day = ServicesModel::new(ServicesConfig::default());
        let mut model_night = ServicesModel::new(ServicesConfig::default());
        let day = model_day.step(&DemandContext { clock: &clock_day, synoptic: &synoptic(), curtailment01: 1.0, grid_stress01: 0.0 });
        let night = model_night.step(&DemandContext { clock: &clock_night, synoptic: &synoptic(), curtailment01: 1.0, grid_stress01: 0.0 });
        assert!(day > night);
    }
}
