//! Residential space heating (spec §4.4).

use serde::Deserialize;

use super::{low_pass, DemandContext};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResidentialHeatingConfig {
    pub design_thermal_mw: f32,
    pub building_tau_s: f32,
    pub schedule_tau_s: f32,
    pub hp_air_share: f32,
    pub hp_exhaust_share: f32,
    pub hp_ground_share: f32,
    pub hp_air_cop: f32,
    pub hp_exhaust_cop: f32,
    pub hp_ground_cop: f32,
    pub aux_resistive_share: f32,
    pub min_curtailment: f32,
}

impl Default for ResidentialHeatingConfig {
    fn default() -> Self {
        Self {
            design_thermal_mw: 25_000.0,
            building_tau_s: 7200.0,
            schedule_tau_s: 1800.0,
            hp_air_share: 0.55,
            hp_exhaust_share: 0.20,
            hp_ground_share: 0.15,
            hp_air_cop: 2.8,
            hp_exhaust_cop: 3.2,
            hp_ground_cop: 3.6,
            aux_resistive_share: 0.10,
            min_curtailment: 0.3,
        }
    }
}

/// Schedule factor by local hour: lower overnight, plateauing in the day.
const SCHEDULE_BY_HOUR: [f32; 24] = [
    0.75, 0.72, 0.70, 0.70, 0.72, 0.80, 0.95, 1.00, 0.98, 0.92, 0.88, 0.86, 0.85, 0.85, 0.86, 0.88,
    0.92, 0.98, 1.00, 0.98, 0.92, 0.85, 0.80, 0.77,
];

pub struct ResidentialHeatingModel {
    config: ResidentialHeatingConfig,
    smoothed_outdoor_temp_c: f32,
    smoothed_schedule: f32,
}

impl ResidentialHeatingModel {
    pub fn new(config: ResidentialHeatingConfig) -> Self {
        Self {
            config,
            smoothed_outdoor_temp_c: 10.0,
            smoothed_schedule: 0.85,
        }
    }

    pub fn step(&mut self, ctx: &DemandContext) -> f32 {
        self.smoothed_outdoor_temp_c = low_pass(self.smoothed_outdoor_temp_c, ctx.synoptic.temperature_c, self.config.building_tau_s, 1.0);

        let hour = ctx.clock.local_hour() as usize;
        let raw_schedule = SCHEDULE_BY_HOUR[hour];
        self.smoothed_schedule = low_pass(self.smoothed_schedule, raw_schedule, self.config.schedule_tau_s, 1.0);

        const DESIGN_TEMP_DIFF_C: f32 = 38.0;
        let heating_degree_factor = ((18.0 - self.smoothed_outdoor_temp_c) / DESIGN_TEMP_DIFF_C).clamp(0.0, 1.0);
        let wind_factor = 1.0 + 0.02 * ctx.synoptic.wind_mps;
        let curtailment = ctx.curtailment01.max(self.config.min_curtailment);

        let thermal_mw = self.config.design_thermal_mw * heating_degree_factor * wind_factor * self.smoothed_schedule * curtailment;

        let cop_blend = self.config.hp_air_share * self.config.hp_air_cop
            + self.config.hp_exhaust_share * self.config.hp_exhaust_cop
            + self.config.hp_ground_share * self.config.hp_ground_cop;
        let hp_share = self.config.hp_air_share + self.config.hp_exhaust_share + self.config.hp_ground_share;
        let hp_thermal_mw = thermal_mw * hp_share;
        let hp_electric_mw = if cop_blend > 0.0 { hp_thermal_mw / cop_blend } else { 0.0 };

        let aux_thermal_mw = thermal_mw * self.config.aux_resistive_share;
        let direct_electric_mw = thermal_mw * (1.0 - hp_share - self.config.aux_resistive_share).max(0.0);

        hp_electric_mw + aux_thermal_mw + direct_electric_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::weather::SynopticState;

    fn synoptic(temp: f32) -> SynopticState {
        SynopticState {
            temperature_c: temp,
            front_offset_c: 0.0,
            wind_mps: 5.0,
            cloud_cover01: 0.3,
            is_snowing: false,
            snow_intensity_mmph: 0.0,
        }
    }

    #[test]
    fn colder_weather_increases_demand() {
        let clock = Clock::new(10);
        let mut model = ResidentialHeatingModel::new(ResidentialHeatingConfig::default());
        for _ in 0..10_000 {
            model.step(&DemandContext { clock: &clock, synoptic: &synoptic(10.0), curtailment01: 1.0, grid_stress01: 0.0 });
        }
        let warm = model.step(&DemandContext { clock: &clock, synoptic: &synoptic(10.0), curtailment01: 1.0, grid_stress01: 0.0 });

        let mut model_cold = ResidentialHeatingModel::new(ResidentialHeatingConfig::default());
        for _ in 0..10_000 {
            model_cold.step(&DemandContext { clock: &clock, synoptic: &synoptic(-15.0), curtailment01: 1.0, grid_stress01: 0.0 });
        }
        let cold = model_cold.step(&DemandContext { clock: &clock, synoptic: &synoptic(-15.0), curtailment01: 1.0, grid_stress01: 0.0 });

        assert!(cold > warm);
    }

    #[test]
    fn demand_never_negative() {
        let clock = Clock::new(10);
        let mut model = ResidentialHeatingModel::new(ResidentialHeatingConfig::default());
        let mw = model.step(&DemandContext { clock: &clock, synoptic: &synoptic(25.0), curtailment01: 1.0, grid_stress01: 0.0 });
        assert!(mw >= 0.0);
    }
}
