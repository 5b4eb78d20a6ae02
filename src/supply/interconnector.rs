//! Interconnectors: either follow a dispatcher target or auto-balance on
//! frequency and system imbalance (spec §4.5). Positive = import.

use serde::Deserialize;

use super::ramp_toward;

#[derive(Debug, Clone, Copy)]
pub enum InterconnectorMode {
    Follow(f32),
    AutoBalance,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterconnectorConfig {
    pub import_cap_mw: f32,
    pub export_cap_mw: f32,
    pub kp_mw_per_hz: f32,
    pub k_imbalance: f32,
    pub ramp_mw_per_s: f32,
    pub smoothing_tau_s: f32,
}

impl Default for InterconnectorConfig {
    fn default() -> Self {
        Self {
            import_cap_mw: 3_500.0,
            export_cap_mw: 3_500.0,
            kp_mw_per_hz: 800.0,
            k_imbalance: 0.3,
            ramp_mw_per_s: 50.0,
            smoothing_tau_s: 10.0,
        }
    }
}

pub struct InterconnectorFleet {
    config: InterconnectorConfig,
    current_mw: f32,
    smoothed_target_mw: f32,
}

impl InterconnectorFleet {
    pub fn new(config: InterconnectorConfig) -> Self {
        Self { config, current_mw: 0.0, smoothed_target_mw: 0.0 }
    }

    pub fn current_mw(&self) -> f32 {
        self.current_mw
    }

    pub fn step(&mut self, mode: InterconnectorMode, frequency_hz: f32, imbalance_mw: f32, market_derate01: f32, dt_s: f32) -> f32 {
        let raw_target = match mode {
            InterconnectorMode::Follow(target_mw) => target_mw,
            InterconnectorMode::AutoBalance => {
                self.config.kp_mw_per_hz * (50.0 - frequency_hz) + self.config.k_imbalance * (-imbalance_mw)
            }
        };

        let cap_import = self.config.import_cap_mw * market_derate01.clamp(0.0, 1.0);
        let cap_export = self.config.export_cap_mw * market_derate01.clamp(0.0, 1.0);
        let clamped_target = raw_target.clamp(-cap_export, cap_import);

        self.smoothed_target_mw += (clamped_target - self.smoothed_target_mw) * (dt_s / self.config.smoothing_tau_s).min(1.0);
        self.current_mw = ramp_toward(self.current_mw, self.smoothed_target_mw, self.config.ramp_mw_per_s, dt_s);
        self.current_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_balance_imports_when_frequency_is_low() {
        let mut fleet = InterconnectorFleet::new(InterconnectorConfig::default());
        let mut mw = 0.0;
        for _ in 0..200 {
            mw = fleet.step(InterconnectorMode::AutoBalance, 49.8, 0.0, 1.0, 1.0);
        }
        assert!(mw > 0.0);
    }

    #[test]
    fn respects_market_derated_caps() {
        let mut fleet = InterconnectorFleet::new(InterconnectorConfig::default());
        let mut mw = 0.0;
        for _ in 0..2000 {
            mw = fleet.step(InterconnectorMode::Follow(100_000.0), 50.0, 0.0, 0.5, 1.0);
        }
        assert!(mw <= InterconnectorConfig::default().import_cap_mw * 0.5 + 1.0);
    }
}
