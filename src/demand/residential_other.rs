//! Residential non-heating demand: appliances, lighting, cooking, laundry,
//! optional DHW/EV (spec §4.4).

use serde::Deserialize;

use super::{gaussian_pulse, DemandContext};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResidentialOtherConfig {
    pub appliances_mw: f32,
    pub lighting_base_mw: f32,
    pub lighting_winter_peak_mw: f32,
    pub cooking_peak_mw: f32,
    pub laundry_mw: f32,
    pub dhw_mw: f32,
    pub ev_mw: f32,
    pub include_dhw: bool,
    pub include_ev: bool,
}

impl Default for ResidentialOtherConfig {
    fn default() -> Self {
        Self {
            appliances_mw: 2_500.0,
            lighting_base_mw: 600.0,
            lighting_winter_peak_mw: 1_800.0,
            cooking_peak_mw: 900.0,
            laundry_mw: 450.0,
            dhw_mw: 1_100.0,
            ev_mw: 1_600.0,
            include_dhw: true,
            include_ev: true,
        }
    }
}

/// Darkness factor by local hour, by month-independent approximation: higher
/// at night, near zero at midday. Scaled by the synoptic cloud cover.
fn darkness_factor(hour: u32) -> f32 {
    const DARKNESS_BY_HOUR: [f32; 24] = [
        0.95, 0.95, 0.9, 0.85, 0.7, 0.5, 0.3, 0.15, 0.05, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.05, 0.2,
        0.45, 0.7, 0.85, 0.92, 0.95, 0.95, 0.95,
    ];
    DARKNESS_BY_HOUR[hour as usize]
}

pub struct ResidentialOtherModel {
    config: ResidentialOtherConfig,
}

impl ResidentialOtherModel {
    pub fn new(config: ResidentialOtherConfig) -> Self {
        Self { config }
    }

    pub fn step(&mut self, ctx: &DemandContext) -> f32 {
        let hour = ctx.clock.local_hour();
        let hour_frac = hour as f32 + ctx.clock.local_minute() as f32 / 60.0;

        let lighting = self.config.lighting_base_mw
            + (self.config.lighting_winter_peak_mw - self.config.lighting_base_mw)
                * darkness_factor(hour)
                * (0.7 + 0.3 * ctx.synoptic.cloud_cover01);

        let cooking = self.config.cooking_peak_mw
            * (gaussian_pulse(hour_frac, 7.5, 0.8) + gaussian_pulse(hour_frac, 18.5, 1.2)).min(1.0);

        let laundry = self.config.laundry_mw * gaussian_pulse(hour_frac, 19.5, 3.0);

        let mut total = self.config.appliances_mw * ctx.curtailment01 + lighting + cooking + laundry;
        if self.config.include_dhw {
            total += self.config.dhw_mw * (0.3 + 0.7 * gaussian_pulse(hour_frac, 7.0, 2.5));
        }
        if self.config.include_ev {
            total += self.config.ev_mw * (0.4 + 0.6 * gaussian_pulse(hour_frac, 22.0, 3.0));
        }
        total.max(0.0)
    }
}
