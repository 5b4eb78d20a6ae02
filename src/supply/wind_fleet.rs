//! Regional wind fleet: smoothing, gust hysteresis trip/restart, the fleet
//! power curve, icing derate, and a double low-pass on output (spec §4.5).

use serde::Deserialize;

use crate::weather::{WindRegion, WIND_REGIONS};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindFleetConfig {
    pub installed_mw: f32,
    pub region_share: [f32; WIND_REGIONS],
    pub wind_tau_s: f32,
    pub gust_trip_mps: f32,
    pub gust_restart_mps: f32,
    pub min_down_s: f32,
    pub icing_max_derate: f32,
    pub icing_temp_center_c: f32,
    pub icing_temp_std_c: f32,
    pub lp1_tau_s: f32,
    pub lp2_tau_s: f32,
}

impl Default for WindFleetConfig {
    fn default() -> Self {
        Self {
            installed_mw: 12_000.0,
            region_share: [0.18, 0.15, 0.14, 0.12, 0.11, 0.10, 0.10, 0.10],
            wind_tau_s: 900.0,
            gust_trip_mps: 50.0,
            gust_restart_mps: 45.0,
            min_down_s: 60.0,
            icing_max_derate: 0.35,
            icing_temp_center_c: -2.0,
            icing_temp_std_c: 3.0,
            lp1_tau_s: 180.0,
            lp2_tau_s: 120.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RegionState {
    smoothed_wind_mps: f32,
    tripped: bool,
    down_timer_s: f32,
    lp1_fraction: f32,
    lp2_fraction: f32,
}

pub struct WindFleet {
    config: WindFleetConfig,
    regions: [RegionState; WIND_REGIONS],
}

fn power_curve_fraction(v: f32) -> f32 {
    if v < 3.0 {
        0.0
    } else if v < 12.0 {
        ((v - 3.0) / 9.0).powi(2)
    } else if v <= 25.0 {
        1.0
    } else {
        0.0
    }
}

fn low_pass(x: f32, target: f32, tau_s: f32, dt_s: f32) -> f32 {
    x + (target - x) * (dt_s / tau_s).min(1.0)
}

impl WindFleet {
    pub fn new(config: WindFleetConfig) -> Self {
        Self { config, regions: [RegionState::default(); WIND_REGIONS] }
    }

    pub fn step(&mut self, wind_regions: &[WindRegion; WIND_REGIONS], dt_s: f32) -> f32 {
        let mut total_mw = 0.0;
        for i in 0..WIND_REGIONS {
            let region = &wind_regions[i];
            let state = &mut self.regions[i];

            state.smoothed_wind_mps = low_pass(state.smoothed_wind_mps, region.wind_speed_100m_mps, self.config.wind_tau_s, dt_s);

            if state.tripped {
                state.down_timer_s += dt_s;
                if region.wind_gust_mps <= self.config.gust_restart_mps && state.down_timer_s >= self.config.min_down_s {
                    state.tripped = false;
                    state.down_timer_s = 0.0;
                }
            } else if region.wind_gust_mps >= self.config.gust_trip_mps {
                state.tripped = true;
                state.down_timer_s = 0.0;
            }

            let raw_fraction = if state.tripped { 0.0 } else { power_curve_fraction(state.smoothed_wind_mps) };

            let icing_gaussian = (-((region.temperature_c - self.config.icing_temp_center_c).powi(2))
                / (2.0 * self.config.icing_temp_std_c * self.config.icing_temp_std_c))
                .exp();
            let icing_derate = self.config.icing_max_derate * region.icing_risk01 * icing_gaussian;
            let derated_fraction = (raw_fraction * (1.0 - icing_derate)).clamp(0.0, 1.0);

            state.lp1_fraction = low_pass(state.lp1_fraction, derated_fraction, self.config.lp1_tau_s, dt_s);
            state.lp2_fraction = low_pass(state.lp2_fraction, state.lp1_fraction, self.config.lp2_tau_s, dt_s);

            let region_capacity_mw = self.config.installed_mw * self.config.region_share[i];
            total_mw += region_capacity_mw * state.lp2_fraction;
        }
        total_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(wind: f32, gust: f32, temp: f32, icing: f32) -> WindRegion {
        WindRegion { wind_speed_100m_mps: wind, wind_gust_mps: gust, temperature_c: temp, icing_risk01: icing }
    }

    #[test]
    fn output_bounded_by_installed_capacity() {
        let mut fleet = WindFleet::new(WindFleetConfig::default());
        let regions: [WindRegion; WIND_REGIONS] = std::array::from_fn(|_| region(20.0, 22.0, 10.0, 0.0));
        let mut mw = 0.0;
        for _ in 0..3000 {
            mw = fleet.step(&regions, 1.0);
        }
        assert!(mw <= WindFleetConfig::default().installed_mw + 1.0);
        assert!(mw > 0.0);
    }

    #[test]
    fn gust_trip_eventually_zeroes_output() {
        let mut fleet = WindFleet::new(WindFleetConfig::default());
        let calm: [WindRegion; WIND_REGIONS] = std::array::from_fn(|_| region(15.0, 16.0, 10.0, 0.0));
        for _ in 0..1000 {
            fleet.step(&calm, 1.0);
        }
        let storm: [WindRegion; WIND_REGIONS] = std::array::from_fn(|_| region(40.0, 55.0, 10.0, 0.0));
        let mut mw = 0.0;
        for _ in 0..1000 {
            mw = fleet.step(&storm, 1.0);
        }
        assert!(mw < WindFleetConfig::default().installed_mw * 0.3);
    }
}
