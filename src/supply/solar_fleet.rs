//! Regional solar PV fleet: DC/AC clipping, NOCT cell-temperature derate,
//! and a snow-cover state per site (spec §4.5).

use serde::Deserialize;

use crate::weather::{SolarSite, SOLAR_SITES};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarFleetConfig {
    pub installed_ac_mw: f32,
    pub site_share: [f32; SOLAR_SITES],
    pub dc_ac_ratio: f32,
    pub noct_c: f32,
    pub temp_coeff_per_c: f32,
    pub snow_accum_rate_per_mmph: f32,
    pub snow_cold_boost: f32,
    pub snow_melt_rate_per_c: f32,
    pub snow_melt_rate_per_wm2: f32,
}

impl Default for SolarFleetConfig {
    fn default() -> Self {
        Self {
            installed_ac_mw: 4_500.0,
            site_share: [0.6, 0.4],
            dc_ac_ratio: 1.15,
            noct_c: 45.0,
            temp_coeff_per_c: -0.004,
            snow_accum_rate_per_mmph: 0.08,
            snow_cold_boost: 1.5,
            snow_melt_rate_per_c: 0.02,
            snow_melt_rate_per_wm2: 0.0003,
        }
    }
}

pub struct SolarFleet {
    config: SolarFleetConfig,
    snow_cover: [f32; SOLAR_SITES],
}

impl SolarFleet {
    pub fn new(config: SolarFleetConfig) -> Self {
        Self { config, snow_cover: [0.0; SOLAR_SITES] }
    }

    pub fn snow_cover(&self) -> [f32; SOLAR_SITES] {
        self.snow_cover
    }

    pub fn step(&mut self, solar_sites: &[SolarSite; SOLAR_SITES], dt_s: f32) -> f32 {
        let mut total_mw = 0.0;
        for i in 0..SOLAR_SITES {
            let site = &solar_sites[i];

            let cell_temp_c = site.temperature_c + (self.config.noct_c - 20.0) / 800.0 * site.solar_irradiance_wm2;
            let temp_derate = (1.0 + self.config.temp_coeff_per_c * (cell_temp_c - 25.0)).clamp(0.4, 1.1);

            if site.precipitation_snow_mmph > 0.0 {
                let cold_boost = if site.temperature_c <= 1.0 { self.config.snow_cold_boost } else { 1.0 };
                let accum = site.precipitation_snow_mmph * self.config.snow_accum_rate_per_mmph * cold_boost;
                self.snow_cover[i] = (self.snow_cover[i] + accum * dt_s / 3600.0).min(1.0);
            }
            let melt = site.temperature_c.max(0.0) * self.config.snow_melt_rate_per_c
                + site.solar_irradiance_wm2 * self.config.snow_melt_rate_per_wm2;
            self.snow_cover[i] = (self.snow_cover[i] - melt * dt_s / 3600.0).clamp(0.0, 1.0);

            let site_ac_mw = self.config.installed_ac_mw * self.config.site_share[i];
            let dc_mw = site_ac_mw * self.config.dc_ac_ratio * (site.solar_irradiance_wm2 / 1000.0) * temp_derate * (1.0 - self.snow_cover[i]);
            total_mw += dc_mw.clamp(0.0, site_ac_mw);
        }
        total_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(irradiance: f32, temp: f32, precip: f32) -> SolarSite {
        SolarSite { solar_irradiance_wm2: irradiance, temperature_c: temp, cloud_cover01: 0.2, precipitation_snow_mmph: precip }
    }

    #[test]
    fn no_sun_yields_zero_output() {
        let mut fleet = SolarFleet::new(SolarFleetConfig::default());
        let sites = [site(0.0, 5.0, 0.0); SOLAR_SITES];
        assert_eq!(fleet.step(&sites, 1.0), 0.0);
    }

    #[test]
    fn output_clipped_at_ac_rating() {
        let mut fleet = SolarFleet::new(SolarFleetConfig::default());
        let sites = [site(1400.0, 25.0, 0.0); SOLAR_SITES];
        let mw = fleet.step(&sites, 1.0);
        assert!(mw <= SolarFleetConfig::default().installed_ac_mw + 1.0);
    }

    #[test]
    fn persistent_snow_reduces_output_over_time() {
        let mut fleet = SolarFleet::new(SolarFleetConfig::default());
        let snowy_sites = [site(900.0, -5.0, 2.0); SOLAR_SITES];
        let first = fleet.step(&snowy_sites, 1.0);
        for _ in 0..5000 {
            fleet.step(&snowy_sites, 1.0);
        }
        let later = fleet.step(&snowy_sites, 1.0);
        assert!(later <= first);
    }
}
