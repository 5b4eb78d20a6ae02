//! FCR-N: filtered-droop primary reserve controller.

use serde::Deserialize;

use super::ramp_toward_asymmetric;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FcrNConfig {
    pub filter_tau_s: f32,
    pub deadband_hz: f32,
    pub full_hz: f32,
    pub ramp_up_mw_per_s: f32,
    pub ramp_down_mw_per_s: f32,
}

impl Default for FcrNConfig {
    fn default() -> Self {
        Self {
            filter_tau_s: 2.0,
            deadband_hz: 0.02,
            full_hz: 0.20,
            ramp_up_mw_per_s: 200.0,
            ramp_down_mw_per_s: 300.0,
        }
    }
}

pub struct FcrNController {
    config: FcrNConfig,
    filtered_hz: f32,
    current_mw: f32,
}

impl FcrNController {
    pub fn new(config: FcrNConfig) -> Self {
        Self { config, filtered_hz: 50.0, current_mw: 0.0 }
    }

    pub fn current_mw(&self) -> f32 {
        self.current_mw
    }

    /// Saturation in `[0, 1]`, used by the dispatcher's escalation logic.
    pub fn saturation01(&self, capacity_up_mw: f32, capacity_down_mw: f32) -> f32 {
        let cap = if self.current_mw >= 0.0 { capacity_up_mw } else { capacity_down_mw };
        if cap <= 0.0 { 0.0 } else { (self.current_mw.abs() / cap).min(1.0) }
    }

    pub fn step(&mut self, raw_frequency_hz: f32, capacity_up_mw: f32, capacity_down_mw: f32, dt_s: f32) -> f32 {
        self.filtered_hz += (raw_frequency_hz - self.filtered_hz) * (dt_s / self.config.filter_tau_s).min(1.0);

        let df = self.filtered_hz - 50.0;
        let df_abs = df.abs();
        let frac = if df_abs <= self.config.deadband_hz {
            0.0
        } else {
            ((df_abs - self.config.deadband_hz) / (self.config.full_hz - self.config.deadband_hz)).clamp(0.0, 1.0)
        };
        let capacity = if df < 0.0 { capacity_up_mw } else { capacity_down_mw };
        let request_mw = -df.signum() * frac * capacity;

        self.current_mw = ramp_toward_asymmetric(self.current_mw, request_mw, self.config.ramp_up_mw_per_s, self.config.ramp_down_mw_per_s, dt_s);
        self.current_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_at_zero_inside_deadband() {
        let mut ctrl = FcrNController::new(FcrNConfig::default());
        for _ in 0..10 {
            ctrl.step(50.01, 900.0, 900.0, 1.0);
        }
        assert_eq!(ctrl.current_mw(), 0.0);
    }

    #[test]
    fn responds_upward_when_frequency_low() {
        let mut ctrl = FcrNController::new(FcrNConfig::default());
        let mut mw = 0.0;
        for _ in 0..30 {
            mw = ctrl.step(49.70, 900.0, 900.0, 1.0);
        }
        assert!(mw > 400.0);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut ctrl = FcrNController::new(FcrNConfig::default());
        let mut mw = 0.0;
        for _ in 0..100 {
            mw = ctrl.step(49.0, 900.0, 900.0, 1.0);
        }
        assert!(mw <= 900.0 + 1.0);
    }
}
