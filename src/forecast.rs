//! 24 h mean-reverting forecast arrays, recomputed on a 60 s cadence with
//! √h-growing uncertainty (spec §4.3).

use serde::Deserialize;

use crate::clock::Clock;
use crate::weather::{seasonal_targets, solar_elevation_sin_public, SynopticState};

/// One point every 60 s across a 24 h horizon, inclusive of both ends.
pub const HORIZON_POINTS: usize = 1441;
const RESOLUTION_S: i32 = 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub time_constant_h: f32,
    pub temperature_sigma0_c: f32,
    pub temperature_sigma_k: f32,
    pub wind_sigma0_mps: f32,
    pub wind_sigma_k: f32,
    pub cloud_sigma0: f32,
    pub cloud_sigma_k: f32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            time_constant_h: 6.0,
            temperature_sigma0_c: 0.3,
            temperature_sigma_k: 0.6,
            wind_sigma0_mps: 0.3,
            wind_sigma_k: 0.5,
            cloud_sigma0: 0.03,
            cloud_sigma_k: 0.05,
        }
    }
}

/// Parallel 1441-point sequences at 60 s resolution, plus their σ sequences.
#[derive(Debug, Clone)]
pub struct ForecastArrays {
    pub temperature_c: Vec<f32>,
    pub temperature_sigma_c: Vec<f32>,
    pub wind_mps: Vec<f32>,
    pub wind_sigma_mps: Vec<f32>,
    pub cloud01: Vec<f32>,
    pub cloud_sigma01: Vec<f32>,
    pub snow_mmph: Vec<f32>,
    pub solar_wm2: Vec<f32>,
    pub icing01: Vec<f32>,
}

impl Default for ForecastArrays {
    fn default() -> Self {
        Self {
            temperature_c: vec![0.0; HORIZON_POINTS],
            temperature_sigma_c: vec![0.0; HORIZON_POINTS],
            wind_mps: vec![0.0; HORIZON_POINTS],
            wind_sigma_mps: vec![0.0; HORIZON_POINTS],
            cloud01: vec![0.0; HORIZON_POINTS],
            cloud_sigma01: vec![0.0; HORIZON_POINTS],
            snow_mmph: vec![0.0; HORIZON_POINTS],
            solar_wm2: vec![0.0; HORIZON_POINTS],
            icing01: vec![0.0; HORIZON_POINTS],
        }
    }
}

impl ForecastArrays {
    /// Linear interpolation read at an arbitrary seconds-since-midnight
    /// offset; callers outside the horizon get the nearest endpoint.
    pub fn read(series: &[f32], time_s: i32) -> f32 {
        let idx_f = (time_s.max(0) as f32) / (RESOLUTION_S as f32);
        let lo = (idx_f.floor() as usize).min(series.len() - 1);
        let hi = (lo + 1).min(series.len() - 1);
        let frac = idx_f - lo as f32;
        series[lo] + (series[hi] - series[lo]) * frac
    }
}

/// Recomputes [`ForecastArrays`] every 60 s of simulated time.
pub struct Forecast {
    config: ForecastConfig,
    arrays: ForecastArrays,
    last_recompute_minute: Option<i32>,
}

impl Forecast {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            arrays: ForecastArrays::default(),
            last_recompute_minute: None,
        }
    }

    pub fn arrays(&self) -> &ForecastArrays {
        &self.arrays
    }

    /// Recomputes the arrays if a new 60 s boundary has been crossed.
    pub fn step(&mut self, clock: &Clock, synoptic: &SynopticState) {
        let minute = clock.time_s().div_euclid(RESOLUTION_S);
        if self.last_recompute_minute == Some(minute) {
            return;
        }
        self.last_recompute_minute = Some(minute);
        self.recompute(clock, synoptic);
    }

    fn recompute(&mut self, clock: &Clock, synoptic: &SynopticState) {
        let day = clock.day_of_year();
        let base_hour = clock.local_hour() as f32 + clock.local_minute() as f32 / 60.0;
        let decay_per_min = (-1.0 / (self.config.time_constant_h * 60.0)).exp();

        let mut temp = synoptic.temperature_c;
        let mut wind = synoptic.wind_mps;
        let mut cloud = synoptic.cloud_cover01;

        for k in 0..HORIZON_POINTS {
            let hour_ahead = k as f32 / 60.0;
            let hour_of_day = (base_hour + hour_ahead).rem_euclid(24.0);
            let targets = seasonal_targets(day, hour_of_day);

            temp = targets.temperature_c + (temp - targets.temperature_c) * decay_per_min;
            wind = targets.wind_mps + (wind - targets.wind_mps) * decay_per_min;
            cloud = (targets.cloud01 + (cloud - targets.cloud01) * decay_per_min).clamp(0.0, 1.0);

            let sqrt_h = hour_ahead.sqrt();
            self.arrays.temperature_c[k] = temp;
            self.arrays.temperature_sigma_c[k] = self.config.temperature_sigma0_c + self.config.temperature_sigma_k * sqrt_h;
            self.arrays.wind_mps[k] = wind;
            self.arrays.wind_sigma_mps[k] = self.config.wind_sigma0_mps + self.config.wind_sigma_k * sqrt_h;
            self.arrays.cloud01[k] = cloud;
            self.arrays.cloud_sigma01[k] = (self.config.cloud_sigma0 + self.config.cloud_sigma_k * sqrt_h).min(0.5);
            self.arrays.snow_mmph[k] = if synoptic.is_snowing { synoptic.snow_intensity_mmph } else { 0.0 };

            let elevation_sin = solar_elevation_sin_public(day, hour_of_day);
            let attenuation = 1.0 - 0.75 * cloud.powf(1.3);
            self.arrays.solar_wm2[k] = 1000.0 * 0.75 * elevation_sin.max(0.0) * attenuation;
            self.arrays.icing01[k] = if synoptic.is_snowing && (-3.0..=0.5).contains(&temp) { 1.0 } else { 0.0 };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_synoptic() -> SynopticState {
        SynopticState {
            temperature_c: 5.0,
            front_offset_c: 0.0,
            wind_mps: 6.0,
            cloud_cover01: 0.4,
            is_snowing: false,
            snow_intensity_mmph: 0.0,
        }
    }

    #[test]
    fn arrays_have_horizon_length() {
        let mut forecast = Forecast::new(ForecastConfig::default());
        let clock = Clock::new(10);
        forecast.step(&clock, &sample_synoptic());
        assert_eq!(forecast.arrays().temperature_c.len(), HORIZON_POINTS);
        assert_eq!(forecast.arrays().cloud01.len(), HORIZON_POINTS);
    }

    #[test]
    fn sigma_grows_with_horizon() {
        let mut forecast = Forecast::new(ForecastConfig::default());
        let clock = Clock::new(10);
        forecast.step(&clock, &sample_synoptic());
        let sigmas = &forecast.arrays().temperature_sigma_c;
        assert!(sigmas[HORIZON_POINTS - 1] > sigmas[0]);
    }

    #[test]
    fn recompute_only_on_minute_boundary() {
        let mut forecast = Forecast::new(ForecastConfig::default());
        let mut clock = Clock::new(10);
        forecast.step(&clock, &sample_synoptic());
        let before = forecast.arrays().temperature_c[0];
        clock.advance();
        forecast.step(&clock, &SynopticState { temperature_c: 99.0, ..sample_synoptic() });
        assert_eq!(forecast.arrays().temperature_c[0], before);
    }

    #[test]
    fn read_interpolates_linearly() {
        let series = vec![0.0, 10.0, 20.0];
        assert!((ForecastArrays::read(&series, 30) - 5.0).abs() < 1e-5);
    }
}
