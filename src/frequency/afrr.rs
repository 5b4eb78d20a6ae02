//! aFRR: filtered PI secondary reserve controller with persistence arming
//! and an optional imbalance-assist term.

use serde::Deserialize;

use super::ramp_toward_asymmetric;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AfrrConfig {
    pub filter_tau_s: f32,
    pub arm_threshold_hz: f32,
    pub arm_persistence_s: f32,
    pub kp_mw_per_hz: f32,
    pub ki_mw_per_hz_s: f32,
    pub integrator_leak_per_s: f32,
    pub imbalance_assist_gain: f32,
    pub ramp_up_mw_per_s: f32,
    pub ramp_down_mw_per_s: f32,
}

impl Default for AfrrConfig {
    fn default() -> Self {
        Self {
            filter_tau_s: 5.0,
            arm_threshold_hz: 0.03,
            arm_persistence_s: 30.0,
            kp_mw_per_hz: 5_000.0,
            ki_mw_per_hz_s: 120.0,
            integrator_leak_per_s: 0.05,
            imbalance_assist_gain: 0.15,
            ramp_up_mw_per_s: 40.0,
            ramp_down_mw_per_s: 60.0,
        }
    }
}

pub struct AfrrController {
    config: AfrrConfig,
    filtered_hz: f32,
    integral_mw: f32,
    current_mw: f32,
    armed_timer_s: f32,
    armed: bool,
}

impl AfrrController {
    pub fn new(config: AfrrConfig) -> Self {
        Self { config, filtered_hz: 50.0, integral_mw: 0.0, current_mw: 0.0, armed_timer_s: 0.0, armed: false }
    }

    pub fn current_mw(&self) -> f32 {
        self.current_mw
    }

    pub fn saturation01(&self, capacity_up_mw: f32, capacity_down_mw: f32) -> f32 {
        let cap = if self.current_mw >= 0.0 { capacity_up_mw } else { capacity_down_mw };
        if cap <= 0.0 { 0.0 } else { (self.current_mw.abs() / cap).min(1.0) }
    }

    pub fn step(&mut self, raw_frequency_hz: f32, net_imbalance_mw: f32, capacity_up_mw: f32, capacity_down_mw: f32, dt_s: f32) -> f32 {
        self.filtered_hz += (raw_frequency_hz - self.filtered_hz) * (dt_s / self.config.filter_tau_s).min(1.0);
        let df = self.filtered_hz - 50.0;

        if df.abs() >= self.config.arm_threshold_hz {
            self.armed_timer_s += dt_s;
        } else {
            self.armed_timer_s = 0.0;
        }
        self.armed = self.armed_timer_s >= self.config.arm_persistence_s;

        let target_mw = if self.armed {
            self.integral_mw += -df * self.config.ki_mw_per_hz_s * dt_s;
            let cap = if df < 0.0 { capacity_up_mw } else { capacity_down_mw };
            self.integral_mw = self.integral_mw.clamp(-cap, cap);

            let proportional = -df * self.config.kp_mw_per_hz;
            let assist = -net_imbalance_mw * self.config.imbalance_assist_gain;
            (proportional + self.integral_mw + assist).clamp(-capacity_down_mw, capacity_up_mw)
        } else {
            self.integral_mw -= self.integral_mw * (self.config.integrator_leak_per_s * dt_s).min(1.0);
            0.0
        };

        self.current_mw = ramp_toward_asymmetric(self.current_mw, target_mw, self.config.ramp_up_mw_per_s, self.config.ramp_down_mw_per_s, dt_s);
        self.current_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_arm_on_brief_excursions() {
        let mut ctrl = AfrrController::new(AfrrConfig::default());
        for _ in 0..10 {
            ctrl.step(49.90, 0.0, 1200.0, 1200.0, 1.0);
        }
        assert!(!ctrl.armed);
        assert_eq!(ctrl.current_mw(), 0.0);
    }

    #[test]
    fn arms_and_responds_after_persistence() {
        let mut ctrl = AfrrController::new(AfrrConfig::default());
        let mut mw = 0.0;
        for _ in 0..120 {
            mw = ctrl.step(49.90, 0.0, 1200.0, 1200.0, 1.0);
        }
        assert!(ctrl.armed);
        assert!(mw > 0.0);
    }

    #[test]
    fn respects_capacity_bounds() {
        let mut ctrl = AfrrController::new(AfrrConfig::default());
        let mut mw = 0.0;
        for _ in 0..600 {
            mw = ctrl.step(49.50, 0.0, 1200.0, 1200.0, 1.0);
        }
        assert!(mw <= 1200.0 + 1.0);
    }
}
