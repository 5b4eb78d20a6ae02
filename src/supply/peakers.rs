//! Gas/oil peaking plants: off or following a target, gated by a cold-start
//! delay and a minimum-stable floor once running (spec §4.5).

use serde::Deserialize;

use super::ramp_toward;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeakersConfig {
    pub capacity_mw: f32,
    pub cold_start_delay_s: f32,
    pub min_stable_mw: f32,
    pub ramp_mw_per_s: f32,
}

impl Default for PeakersConfig {
    fn default() -> Self {
        Self {
            capacity_mw: 2_800.0,
            cold_start_delay_s: 600.0,
            min_stable_mw: 300.0,
            ramp_mw_per_s: 15.0,
        }
    }
}

pub struct PeakersFleet {
    config: PeakersConfig,
    current_mw: f32,
    starting: bool,
    start_timer_s: f32,
}

impl PeakersFleet {
    pub fn new(config: PeakersConfig) -> Self {
        Self { config, current_mw: 0.0, starting: false, start_timer_s: 0.0 }
    }

    pub fn current_mw(&self) -> f32 {
        self.current_mw
    }

    pub fn is_starting(&self) -> bool {
        self.starting
    }

    pub fn step(&mut self, target_mw: f32, dt_s: f32) -> f32 {
        if target_mw <= 0.0 {
            self.starting = false;
            self.start_timer_s = 0.0;
            self.current_mw = ramp_toward(self.current_mw, 0.0, self.config.ramp_mw_per_s, dt_s).max(0.0);
            return self.current_mw;
        }

        if self.current_mw <= 0.0 && !self.starting {
            self.starting = true;
            self.start_timer_s = 0.0;
        }

        if self.starting {
            self.start_timer_s += dt_s;
            if self.start_timer_s >= self.config.cold_start_delay_s {
                self.starting = false;
                self.current_mw = self.config.min_stable_mw.min(self.config.capacity_mw);
            }
            return self.current_mw;
        }

        let clamped_target = target_mw.clamp(self.config.min_stable_mw, self.config.capacity_mw);
        self.current_mw = ramp_toward(self.current_mw, clamped_target, self.config.ramp_mw_per_s, dt_s);
        self.current_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_off_during_cold_start_delay() {
        let mut fleet = PeakersFleet::new(PeakersConfig::default());
        for _ in 0..599 {
            assert_eq!(fleet.step(1000.0, 1.0), 0.0);
        }
        assert!(fleet.is_starting());
    }

    #[test]
    fn comes_online_at_min_stable_after_delay() {
        let mut fleet = PeakersFleet::new(PeakersConfig::default());
        for _ in 0..600 {
            fleet.step(1000.0, 1.0);
        }
        assert!(fleet.current_mw() > 0.0);
        assert!(!fleet.is_starting());
    }

    #[test]
    fn target_zero_ramps_down_to_zero() {
        let mut fleet = PeakersFleet::new(PeakersConfig::default());
        for _ in 0..700 {
            fleet.step(1000.0, 1.0);
        }
        for _ in 0..500 {
            fleet.step(0.0, 1.0);
        }
        assert_eq!(fleet.current_mw(), 0.0);
    }
}
