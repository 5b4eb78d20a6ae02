//! FFR: one-shot fast frequency response with an energy budget and cooldown.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FfrConfig {
    pub trigger_freq_hz: f32,
    pub trigger_rocof_hz_per_s: f32,
    pub hard_trigger_freq_hz: f32,
    pub ramp_up_s: f32,
    pub hold_s: f32,
    pub ramp_down_s: f32,
    pub power_mw: f32,
    pub energy_budget_mwh: f32,
    pub cooldown_s: f32,
}

impl Default for FfrConfig {
    fn default() -> Self {
        Self {
            trigger_freq_hz: 49.70,
            trigger_rocof_hz_per_s: -0.01,
            hard_trigger_freq_hz: 49.60,
            ramp_up_s: 1.0,
            hold_s: 5.0,
            ramp_down_s: 10.0,
            power_mw: 400.0,
            energy_budget_mwh: 3.0,
            cooldown_s: 900.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    RampUp(f32),
    Hold(f32),
    RampDown(f32),
    Cooldown(f32),
}

pub struct FfrController {
    config: FfrConfig,
    phase: Phase,
    energy_used_mwh: f32,
}

impl FfrController {
    pub fn new(config: FfrConfig) -> Self {
        Self { config, phase: Phase::Idle, energy_used_mwh: 0.0 }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    fn triggers(&self, frequency_hz: f32, rocof_hz_per_s: f32) -> bool {
        (frequency_hz <= self.config.trigger_freq_hz && rocof_hz_per_s <= self.config.trigger_rocof_hz_per_s)
            || frequency_hz <= self.config.hard_trigger_freq_hz
    }

    pub fn step(&mut self, frequency_hz: f32, rocof_hz_per_s: f32, dt_s: f32) -> f32 {
        let budget_exhausted = self.energy_used_mwh >= self.config.energy_budget_mwh;

        self.phase = match self.phase {
            Phase::Idle => {
                if !budget_exhausted && self.triggers(frequency_hz, rocof_hz_per_s) {
                    Phase::RampUp(dt_s)
                } else {
                    Phase::Idle
                }
            }
            Phase::RampUp(t) => {
                let t = t + dt_s;
                if t >= self.config.ramp_up_s { Phase::Hold(dt_s) } else { Phase::RampUp(t) }
            }
            Phase::Hold(t) => {
                let t = t + dt_s;
                if t >= self.config.hold_s || budget_exhausted { Phase::RampDown(dt_s) } else { Phase::Hold(t) }
            }
            Phase::RampDown(t) => {
                let t = t + dt_s;
                if t >= self.config.ramp_down_s { Phase::Cooldown(dt_s) } else { Phase::RampDown(t) }
            }
            Phase::Cooldown(t) => {
                let t = t + dt_s;
                if t >= self.config.cooldown_s { Phase::Idle } else { Phase::Cooldown(t) }
            }
        };

        let mw = match self.phase {
            Phase::Idle | Phase::Cooldown(_) => 0.0,
            Phase::RampUp(t) => self.config.power_mw * (t / self.config.ramp_up_s).clamp(0.0, 1.0),
            Phase::Hold(_) => self.config.power_mw,
            Phase::RampDown(t) => self.config.power_mw * (1.0 - t / self.config.ramp_down_s).clamp(0.0, 1.0),
        };

        self.energy_used_mwh += mw * dt_s / 3600.0;
        mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_below_trigger_frequency_without_rocof() {
        let mut ctrl = FfrController::new(FfrConfig::default());
        let mw = ctrl.step(49.80, 0.0, 1.0);
        assert_eq!(mw, 0.0);
    }

    #[test]
    fn hard_trigger_fires_immediately() {
        let mut ctrl = FfrController::new(FfrConfig::default());
        let mw = ctrl.step(49.50, 0.0, 1.0);
        assert!(mw > 0.0);
    }

    #[test]
    fn one_shot_then_cooldown_blocks_retrigger() {
        let mut ctrl = FfrController::new(FfrConfig::default());
        for _ in 0..20 {
            ctrl.step(49.50, 0.0, 1.0);
        }
        assert!(!ctrl.is_armed());
        let mw = ctrl.step(49.50, 0.0, 1.0);
        assert_eq!(mw, 0.0);
    }
}
