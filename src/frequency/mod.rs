//! Swing-equation frequency model and the four reserve controllers
//! (spec §4.7).

mod afrr;
mod fcr;
mod ffr;
mod mfrr;

pub use afrr::{AfrrConfig, AfrrController};
pub use fcr::{FcrNConfig, FcrNController};
pub use ffr::{FfrConfig, FfrController};
pub use mfrr::{MfrrConfig, MfrrController};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrequencyConfig {
    pub load_damping_mw_per_hz: f32,
    pub fcr_droop_deadband_hz: f32,
    pub fcr_droop_full_hz: f32,
    pub fcr_droop_cap_mw: f32,
    pub inertia_min_s: f32,
    pub inertia_max_s: f32,
    pub auto_shed_start_hz: f32,
    pub auto_shed_full_hz: f32,
    pub auto_shed_max_mw: f32,
}

impl FrequencyConfig {
    fn defaults() -> Self {
        Self {
            load_damping_mw_per_hz: 450.0,
            fcr_droop_deadband_hz: 0.02,
            fcr_droop_full_hz: 0.20,
            fcr_droop_cap_mw: 600.0,
            inertia_min_s: 0.5,
            inertia_max_s: 12.0,
            auto_shed_start_hz: 49.4,
            auto_shed_full_hz: 49.0,
            auto_shed_max_mw: 3000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub enum FrequencyBand {
    Normal,
    OffNormal,
    Alert,
    Emergency,
    Blackout,
}

pub fn classify_band(f: f32) -> FrequencyBand {
    if (49.9..=50.1).contains(&f) {
        FrequencyBand::Normal
    } else if (49.8..=50.2).contains(&f) {
        FrequencyBand::OffNormal
    } else if (49.5..=50.5).contains(&f) {
        FrequencyBand::Alert
    } else if (49.0..=51.0).contains(&f) {
        FrequencyBand::Emergency
    } else {
        FrequencyBand::Blackout
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub struct FrequencyBreakdown {
    pub frequency_hz: f32,
    pub rocof_hz_per_s: f32,
    pub band: FrequencyBand,
    pub auto_shed_request_mw: f32,
    pub integrated_energy_imbalance_mwh: f32,
}

/// Generator/motor-load inertia contribution used to derive `H_equiv`.
#[derive(Debug, Clone, Copy)]
pub struct InertiaContribution {
    pub mw: f32,
    pub inertia_constant_s: f32,
}

pub fn equivalent_inertia(config: &FrequencyConfig, contributions: &[InertiaContribution]) -> (f32, f32) {
    let s: f32 = contributions.iter().map(|c| c.mw).sum();
    if s <= 1.0 {
        return (config.inertia_min_s, s.max(1.0));
    }
    let weighted: f32 = contributions.iter().map(|c| c.mw * c.inertia_constant_s).sum();
    ((weighted / s).clamp(config.inertia_min_s, config.inertia_max_s), s)
}

fn fcr_droop_injection(config: &FrequencyConfig, f: f32) -> f32 {
    let df = f - 50.0;
    let df_abs = df.abs();
    if df_abs <= config.fcr_droop_deadband_hz {
        return 0.0;
    }
    let frac = ((df_abs - config.fcr_droop_deadband_hz) / (config.fcr_droop_full_hz - config.fcr_droop_deadband_hz)).clamp(0.0, 1.0);
    -df.signum() * frac * config.fcr_droop_cap_mw
}

/// Swing-equation model. `pass1` previews the frequency reserve controllers
/// should react to; `pass2` commits the tick's true frequency once reserve
/// injections are known (spec §2's two-pass ordering).
pub struct FrequencyModel {
    config: FrequencyConfig,
    frequency_hz: f32,
    integrated_energy_imbalance_mwh: f32,
}

impl FrequencyModel {
    pub fn new(config: FrequencyConfig) -> Self {
        Self { config, frequency_hz: 50.0, integrated_energy_imbalance_mwh: 0.0 }
    }

    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    fn integrate(&self, p_raw_mw: f32, ffr_mw: f32, load_shed_mw: f32, extra_injection_mw: f32, h_equiv_s: f32, inertial_base_mw: f32, dt_s: f32) -> f32 {
        let damping = -self.config.load_damping_mw_per_hz * (self.frequency_hz - 50.0);
        let droop = fcr_droop_injection(&self.config, self.frequency_hz);
        let p_damped = p_raw_mw + ffr_mw + load_shed_mw + damping + droop + extra_injection_mw;
        let df_dt = (50.0 * p_damped) / (2.0 * h_equiv_s * inertial_base_mw.max(1.0));
        (self.frequency_hz + df_dt * dt_s).clamp(45.0, 55.0)
    }

    /// Provisional frequency before reserve injection, read by the reserve
    /// controllers this tick.
    pub fn pass1(&self, p_raw_mw: f32, ffr_mw: f32, load_shed_mw: f32, h_equiv_s: f32, inertial_base_mw: f32, dt_s: f32) -> f32 {
        self.integrate(p_raw_mw, ffr_mw, load_shed_mw, 0.0, h_equiv_s, inertial_base_mw, dt_s)
    }

    /// Commits the tick's final frequency including reserve injection.
    pub fn pass2(
        &mut self,
        p_raw_mw: f32,
        ffr_mw: f32,
        load_shed_mw: f32,
        reserve_injection_mw: f32,
        h_equiv_s: f32,
        inertial_base_mw: f32,
        dt_s: f32,
    ) -> FrequencyBreakdown {
        let prev_f = self.frequency_hz;
        let new_f = self.integrate(p_raw_mw, ffr_mw, load_shed_mw, reserve_injection_mw, h_equiv_s, inertial_base_mw, dt_s);
        let rocof = (new_f - prev_f) / dt_s;
        self.frequency_hz = new_f;

        let imbalance_mw = 2.0 * h_equiv_s * inertial_base_mw * rocof / 50.0;
        self.integrated_energy_imbalance_mwh += imbalance_mw * dt_s / 3600.0;

        let shed_frac = ((self.config.auto_shed_start_hz - new_f) / (self.config.auto_shed_start_hz - self.config.auto_shed_full_hz)).clamp(0.0, 1.0);

        FrequencyBreakdown {
            frequency_hz: new_f,
            rocof_hz_per_s: rocof,
            band: classify_band(new_f),
            auto_shed_request_mw: shed_frac * self.config.auto_shed_max_mw,
            integrated_energy_imbalance_mwh: self.integrated_energy_imbalance_mwh,
        }
    }
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Ramp-limits `current` toward `target` with independent up/down rates.
pub(crate) fn ramp_toward_asymmetric(current: f32, target: f32, up_rate: f32, down_rate: f32, dt_s: f32) -> f32 {
    let delta = target - current;
    if delta >= 0.0 {
        current + delta.min(up_rate * dt_s)
    } else {
        current + delta.max(-down_rate * dt_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_power_keeps_frequency_at_fifty() {
        let mut model = FrequencyModel::new(FrequencyConfig::default());
        for _ in 0..100 {
            let preview = model.pass1(0.0, 0.0, 0.0, 5.0, 20_000.0, 1.0);
            model.pass2(0.0, 0.0, 0.0, 0.0, 5.0, 20_000.0, 1.0);
            assert!((preview - 50.0).abs() < 1e-6);
        }
        assert!((model.frequency_hz() - 50.0).abs() < 1e-6);
    }

    #[test]
    fn generation_deficit_drops_frequency() {
        let mut model = FrequencyModel::new(FrequencyConfig::default());
        for _ in 0..50 {
            model.pass1(-2000.0, 0.0, 0.0, 5.0, 20_000.0, 1.0);
            model.pass2(-2000.0, 0.0, 0.0, 0.0, 5.0, 20_000.0, 1.0);
        }
        assert!(model.frequency_hz() < 50.0);
    }

    #[test]
    fn frequency_never_leaves_45_55() {
        let mut model = FrequencyModel::new(FrequencyConfig::default());
        for _ in 0..10_000 {
            model.pass1(-1_000_000.0, 0.0, 0.0, 5.0, 20_000.0, 1.0);
            let b = model.pass2(-1_000_000.0, 0.0, 0.0, 0.0, 5.0, 20_000.0, 1.0);
            assert!(b.frequency_hz >= 45.0 && b.frequency_hz <= 55.0);
        }
    }

    #[test]
    fn band_classification_matches_intervals() {
        assert_eq!(classify_band(50.0), FrequencyBand::Normal);
        assert_eq!(classify_band(49.95), FrequencyBand::Normal);
        assert_eq!(classify_band(49.85), FrequencyBand::OffNormal);
        assert_eq!(classify_band(49.6), FrequencyBand::Alert);
        assert_eq!(classify_band(49.2), FrequencyBand::Emergency);
        assert_eq!(classify_band(48.0), FrequencyBand::Blackout);
    }

    #[test]
    fn auto_shed_ramps_between_49_4_and_49_0() {
        let mut model = FrequencyModel::new(FrequencyConfig::default());
        for _ in 0..10_000 {
            model.pass1(-5_000_000.0, 0.0, 0.0, 5.0, 20_000.0, 1.0);
            let b = model.pass2(-5_000_000.0, 0.0, 0.0, 0.0, 5.0, 20_000.0, 1.0);
            if b.frequency_hz <= 49.0 {
                assert!((b.auto_shed_request_mw - 3000.0).abs() < 1.0);
                break;
            }
        }
    }
}
