//! Stochastic weather: synoptic OU/Markov processes plus regional/site
//! derivations (spec §4.2).

mod ou;
mod seasonal;

use rand::rngs::StdRng;
use serde::Deserialize;

use crate::clock::Clock;
use crate::rng::{child_rng, SeedTag};
use ou::{MarkovSwitch, OuProcess};

pub const WIND_REGIONS: usize = 8;
pub const SOLAR_SITES: usize = 2;

/// Regional capacity-share multipliers applied to the synoptic wind speed
/// before adding each region's independent deviation.
const REGION_SITE_MULTIPLIER: [f32; WIND_REGIONS] = [1.05, 0.95, 1.10, 0.90, 1.00, 0.85, 1.15, 0.98];

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    pub temperature_mean_c: f32,
    pub temperature_seasonal_amp_c: f32,
    pub temperature_diurnal_amp_c: f32,
    pub temperature_tau_s: f32,
    pub temperature_sigma: f32,
    pub wind_mean_mps: f32,
    pub wind_seasonal_amp_mps: f32,
    pub wind_tau_s: f32,
    pub wind_sigma: f32,
    pub cloud_mean01: f32,
    pub cloud_seasonal_amp01: f32,
    pub cloud_tau_s: f32,
    pub cloud_sigma: f32,
    pub regional_wind_tau_s: f32,
    pub regional_wind_sigma: f32,
    pub regional_temp_tau_s: f32,
    pub regional_temp_sigma: f32,
    pub snow_start_prob: f32,
    pub snow_stop_prob: f32,
    pub snow_intensity_target_mmph: f32,
    pub snow_intensity_tau_s: f32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            temperature_mean_c: 7.0,
            temperature_seasonal_amp_c: 12.0,
            temperature_diurnal_amp_c: 3.0,
            temperature_tau_s: 3600.0,
            temperature_sigma: 0.08,
            wind_mean_mps: 7.0,
            wind_seasonal_amp_mps: 1.5,
            wind_tau_s: 1800.0,
            wind_sigma: 0.02,
            cloud_mean01: 0.55,
            cloud_seasonal_amp01: 0.15,
            cloud_tau_s: 1200.0,
            cloud_sigma: 0.003,
            regional_wind_tau_s: 900.0,
            regional_wind_sigma: 0.015,
            regional_temp_tau_s: 1800.0,
            regional_temp_sigma: 0.01,
            snow_start_prob: 2e-5,
            snow_stop_prob: 2e-4,
            snow_intensity_target_mmph: 0.7,
            snow_intensity_tau_s: 120.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SynopticState {
    pub temperature_c: f32,
    pub front_offset_c: f32,
    pub wind_mps: f32,
    pub cloud_cover01: f32,
    pub is_snowing: bool,
    pub snow_intensity_mmph: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindRegion {
    pub wind_speed_100m_mps: f32,
    pub wind_gust_mps: f32,
    pub temperature_c: f32,
    pub icing_risk01: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SolarSite {
    pub solar_irradiance_wm2: f32,
    pub temperature_c: f32,
    pub cloud_cover01: f32,
    pub precipitation_snow_mmph: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherBreakdown {
    pub synoptic: SynopticState,
    pub wind_regions: [WindRegion; WIND_REGIONS],
    pub solar_sites: [SolarSite; SOLAR_SITES],
}

/// Owns every OU/Markov process and their seeded RNGs; stepped once per tick.
pub struct Weather {
    config: WeatherConfig,
    temperature: OuProcess,
    front_offset: OuProcess,
    wind: OuProcess,
    cloud: OuProcess,
    snow_switch: MarkovSwitch,
    snow_intensity: OuProcess,
    regional_wind_dev: [OuProcess; WIND_REGIONS],
    regional_temp_dev: [OuProcess; WIND_REGIONS],
    solar_cloud_dev: [OuProcess; SOLAR_SITES],
    solar_snow_cover: [f32; SOLAR_SITES],
    synoptic_rng: StdRng,
    regional_rng: [StdRng; WIND_REGIONS],
    solar_rng: [StdRng; SOLAR_SITES],
    snow_rng: StdRng,
}

impl Weather {
    pub fn new(seed: u64, config: WeatherConfig) -> Self {
        let temperature = OuProcess::new(config.temperature_mean_c, config.temperature_tau_s, config.temperature_sigma, -40.0, 45.0);
        let front_offset = OuProcess::new(0.0, config.temperature_tau_s * 3.0, config.temperature_sigma * 0.5, -8.0, 8.0);
        let wind = OuProcess::new(config.wind_mean_mps, config.wind_tau_s, config.wind_sigma, 0.0, 35.0);
        let cloud = OuProcess::new(config.cloud_mean01, config.cloud_tau_s, config.cloud_sigma, 0.0, 1.0);
        let snow_intensity = OuProcess::new(config.snow_intensity_target_mmph, config.snow_intensity_tau_s, 0.02, 0.1, 2.0);

        let regional_wind_dev = std::array::from_fn(|_| OuProcess::new(0.0, config.regional_wind_tau_s, config.regional_wind_sigma, -8.0, 8.0));
        let regional_temp_dev = std::array::from_fn(|_| OuProcess::new(0.0, config.regional_temp_tau_s, config.regional_temp_sigma, -5.0, 5.0));
        let solar_cloud_dev = std::array::from_fn(|_| OuProcess::new(0.0, config.cloud_tau_s, config.cloud_sigma, -0.3, 0.3));

        Self {
            synoptic_rng: child_rng(seed, SeedTag::SynopticWeather),
            regional_rng: std::array::from_fn(|i| child_rng(seed, SeedTag::RegionalWind(i as u8))),
            solar_rng: std::array::from_fn(|i| child_rng(seed, SeedTag::SolarSite(i as u8))),
            snow_rng: child_rng(seed, SeedTag::Snow),
            config,
            temperature,
            front_offset,
            wind,
            cloud,
            snow_switch: MarkovSwitch::new(false),
            snow_intensity,
            regional_wind_dev,
            regional_temp_dev,
            solar_cloud_dev,
            solar_snow_cover: [0.0; SOLAR_SITES],
        }
    }

    pub fn step(&mut self, clock: &Clock) -> WeatherBreakdown {
        let hour = clock.local_hour() as f32 + clock.local_minute() as f32 / 60.0;
        let day = clock.day_of_year();

        let temp_target = seasonal::seasonal_cosine(day, self.config.temperature_mean_c, self.config.temperature_seasonal_amp_c, 202.0)
            + seasonal::diurnal_sine(hour, self.config.temperature_diurnal_amp_c);
        let wind_target = seasonal::seasonal_cosine(day, self.config.wind_mean_mps, self.config.wind_seasonal_amp_mps, 15.0);
        let cloud_target = seasonal::seasonal_cosine(day, self.config.cloud_mean01, self.config.cloud_seasonal_amp01, 15.0).clamp(0.0, 1.0);

        self.temperature.step(temp_target, 1.0, &mut self.synoptic_rng);
        self.front_offset.step(0.0, 1.0, &mut self.synoptic_rng);
        self.wind.step(wind_target, 1.0, &mut self.synoptic_rng);
        self.cloud.step(cloud_target, 1.0, &mut self.synoptic_rng);

        self.snow_switch.step(self.config.snow_start_prob, self.config.snow_stop_prob, &mut self.snow_rng);
        let snow_target = if self.snow_switch.on() { self.config.snow_intensity_target_mmph } else { 0.0 };
        self.snow_intensity.step(snow_target, 1.0, &mut self.snow_rng);
        let snow_intensity_mmph = if self.snow_switch.on() { self.snow_intensity.value() } else { 0.0 };

        let synoptic = SynopticState {
            temperature_c: self.temperature.value() + self.front_offset.value(),
            front_offset_c: self.front_offset.value(),
            wind_mps: self.wind.value(),
            cloud_cover01: self.cloud.value(),
            is_snowing: self.snow_switch.on(),
            snow_intensity_mmph,
        };

        let mut wind_regions = [WindRegion::default(); WIND_REGIONS];
        for i in 0..WIND_REGIONS {
            self.regional_wind_dev[i].step(0.0, 1.0, &mut self.regional_rng[i]);
            self.regional_temp_dev[i].step(0.0, 1.0, &mut self.regional_rng[i]);
            let wind_speed = (synoptic.wind_mps * REGION_SITE_MULTIPLIER[i] + self.regional_wind_dev[i].value()).clamp(0.0, 35.0);
            let gust_noise = crate::rng::gaussian_noise(&mut self.regional_rng[i], 0.7);
            let gust = (wind_speed + 1.0 + 0.35 * wind_speed + gust_noise).clamp(wind_speed, 45.0);
            let temperature_c = synoptic.temperature_c + self.regional_temp_dev[i].value();
            let icing_risk01 = icing_risk(synoptic.is_snowing, temperature_c);
            wind_regions[i] = WindRegion {
                wind_speed_100m_mps: wind_speed,
                wind_gust_mps: gust,
                temperature_c,
                icing_risk01,
            };
        }

        let mut solar_sites = [SolarSite::default(); SOLAR_SITES];
        for i in 0..SOLAR_SITES {
            self.solar_cloud_dev[i].step(0.0, 1.0, &mut self.solar_rng[i]);
            let cloud_cover01 = (synoptic.cloud_cover01 + self.solar_cloud_dev[i].value()).clamp(0.0, 1.0);
            let elevation_sin = seasonal::solar_elevation_sin(day, hour);
            let attenuation = 1.0 - 0.75 * cloud_cover01.powf(1.3);
            const CLEAR_SKY_IRRADIANCE_WM2: f32 = 1000.0;
            const ATMOSPHERIC_TRANSMITTANCE: f32 = 0.75;
            let solar_irradiance_wm2 =
                CLEAR_SKY_IRRADIANCE_WM2 * ATMOSPHERIC_TRANSMITTANCE * elevation_sin.max(0.0) * attenuation;
            let precipitation_snow_mmph = if synoptic.is_snowing { synoptic.snow_intensity_mmph } else { 0.0 };
            solar_sites[i] = SolarSite {
                solar_irradiance_wm2,
                temperature_c: synoptic.temperature_c,
                cloud_cover01,
                precipitation_snow_mmph,
            };
        }

        WeatherBreakdown { synoptic, wind_regions, solar_sites }
    }
}

/// Seasonal/diurnal targets for a given day-of-year and fractional hour,
/// shared between [`Weather::step`] and [`crate::forecast::Forecast`] so
/// the forecast reverts toward the same curves the synoptic state does.
pub struct SeasonalTargets {
    pub temperature_c: f32,
    pub wind_mps: f32,
    pub cloud01: f32,
}

pub fn seasonal_targets(day_of_year: u16, hour_of_day: f32) -> SeasonalTargets {
    let defaults = WeatherConfig::default();
    SeasonalTargets {
        temperature_c: seasonal::seasonal_cosine(day_of_year, defaults.temperature_mean_c, defaults.temperature_seasonal_amp_c, 202.0)
            + seasonal::diurnal_sine(hour_of_day, defaults.temperature_diurnal_amp_c),
        wind_mps: seasonal::seasonal_cosine(day_of_year, defaults.wind_mean_mps, defaults.wind_seasonal_amp_mps, 15.0),
        cloud01: seasonal::seasonal_cosine(day_of_year, defaults.cloud_mean01, defaults.cloud_seasonal_amp01, 15.0).clamp(0.0, 1.0),
    }
}

pub fn solar_elevation_sin_public(day_of_year: u16, hour_of_day: f32) -> f32 {
    seasonal::solar_elevation_sin(day_of_year, hour_of_day)
}

/// Diurnal shape shared with [`crate::dispatch::plan`] for peak-hour
/// weighting: zero-mean across a day, minimum at hour 5, maximum at hour 17.
pub fn diurnal_sine_public(hour_of_day: f32, amp: f32) -> f32 {
    seasonal::diurnal_sine(hour_of_day, amp)
}

fn icing_risk(is_snowing: bool, temperature_c: f32) -> f32 {
    if !is_snowing {
        return 0.0;
    }
    if (-3.0..=0.5).contains(&temperature_c) {
        1.0
    } else if (-6.0..=2.0).contains(&temperature_c) {
        0.4
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_produces_clamped_fields() {
        let mut clock = Clock::new(1);
        let mut weather = Weather::new(42, WeatherConfig::default());
        for _ in 0..7200 {
            let b = weather.step(&clock);
            assert!(b.synoptic.cloud_cover01 >= 0.0 && b.synoptic.cloud_cover01 <= 1.0);
            assert!(b.synoptic.wind_mps >= 0.0 && b.synoptic.wind_mps <= 35.0);
            for region in &b.wind_regions {
                assert!(region.wind_speed_100m_mps >= 0.0 && region.wind_speed_100m_mps <= 35.0);
                assert!(region.wind_gust_mps >= region.wind_speed_100m_mps);
            }
            clock.advance();
        }
    }

    #[test]
    fn same_seed_is_reproducible_at_tick_3600() {
        let run = |seed: u64| {
            let mut clock = Clock::new(1);
            let mut weather = Weather::new(seed, WeatherConfig::default());
            let mut last = WeatherBreakdown::default();
            for _ in 0..3600 {
                last = weather.step(&clock);
                clock.advance();
            }
            (last.synoptic.temperature_c, last.synoptic.wind_mps, last.synoptic.cloud_cover01)
        };
        assert_eq!(run(99), run(99));
    }
}
