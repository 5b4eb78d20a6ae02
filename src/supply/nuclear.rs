//! Nuclear fleet: six ramp- and minimum-stable-limited units (spec §4.5).

use serde::Deserialize;

use super::ramp_toward;

pub const NUCLEAR_UNITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NuclearDispatchMode {
    /// Runs flat regardless of dispatch signal (used for the 0.98·cap
    /// planning assumption in the dispatcher's residual calculation).
    #[default]
    MustRun,
    /// Every unit ramps toward an equal share of one fleet-level target.
    FollowFleetSchedule,
    /// Each unit ramps independently toward its own target.
    FollowPerUnitSchedule,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NuclearConfig {
    pub unit_capacity_mw: f32,
    pub min_stable_fraction: f32,
    pub unit_ramp_mw_per_s: f32,
    pub fleet_ramp_mw_per_s: f32,
    pub must_run_fraction: f32,
}

impl Default for NuclearConfig {
    fn default() -> Self {
        Self {
            unit_capacity_mw: 1_500.0,
            min_stable_fraction: 0.50,
            unit_ramp_mw_per_s: 0.05,
            fleet_ramp_mw_per_s: 0.30,
            must_run_fraction: 0.98,
        }
    }
}

pub struct NuclearFleet {
    config: NuclearConfig,
    unit_mw: [f32; NUCLEAR_UNITS],
}

impl NuclearFleet {
    pub fn new(config: NuclearConfig) -> Self {
        let initial = config.unit_capacity_mw * config.must_run_fraction;
        Self { config, unit_mw: [initial; NUCLEAR_UNITS] }
    }

    pub fn total_mw(&self) -> f32 {
        self.unit_mw.iter().sum()
    }

    pub fn capacity_mw(&self) -> f32 {
        self.config.unit_capacity_mw * NUCLEAR_UNITS as f32
    }

    pub fn min_stable_mw(&self) -> f32 {
        self.config.unit_capacity_mw * self.config.min_stable_fraction * NUCLEAR_UNITS as f32
    }

    /// `next_target_mw` is the following hour's plan value, used for the
    /// look-ahead feasibility clamp so a unit is never driven so far off
    /// the next scheduled point that it cannot ramp there in time.
    pub fn step(&mut self, mode: NuclearDispatchMode, target_mw: f32, next_target_mw: f32, dt_s: f32) -> f32 {
        let min_unit_mw = self.config.unit_capacity_mw * self.config.min_stable_fraction;
        let max_unit_mw = self.config.unit_capacity_mw;

        let per_unit_targets: [f32; NUCLEAR_UNITS] = match mode {
            NuclearDispatchMode::MustRun => {
                let flat = (self.config.unit_capacity_mw * self.config.must_run_fraction).clamp(min_unit_mw, max_unit_mw);
                [flat; NUCLEAR_UNITS]
            }
            NuclearDispatchMode::FollowFleetSchedule | NuclearDispatchMode::FollowPerUnitSchedule => {
                let share = (target_mw / NUCLEAR_UNITS as f32).clamp(min_unit_mw, max_unit_mw);
                [share; NUCLEAR_UNITS]
            }
        };

        const FEASIBILITY_WINDOW_S: f32 = 3600.0;
        let max_reach_per_unit = self.config.unit_ramp_mw_per_s * FEASIBILITY_WINDOW_S;
        let next_unit_target = (next_target_mw / NUCLEAR_UNITS as f32).clamp(min_unit_mw, max_unit_mw);

        let fleet_budget = self.config.fleet_ramp_mw_per_s * dt_s;
        let mut spent = 0.0f32;
        for (unit, &raw_target) in self.unit_mw.iter_mut().zip(per_unit_targets.iter()) {
            // Must-run ignores the day-ahead schedule entirely, so the
            // look-ahead feasibility window (which only makes sense when
            // following a schedule) does not constrain it.
            let feasible_target = if mode == NuclearDispatchMode::MustRun {
                raw_target
            } else {
                raw_target.clamp(next_unit_target - max_reach_per_unit, next_unit_target + max_reach_per_unit)
            };
            let unit_budget = (self.config.unit_ramp_mw_per_s * dt_s).min((fleet_budget - spent).max(0.0));
            let next = ramp_toward(*unit, feasible_target, unit_budget.max(0.0) / dt_s.max(1e-6), dt_s);
            spent += (next - *unit).abs();
            *unit = next.clamp(min_unit_mw, max_unit_mw);
        }

        self.total_mw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn must_run_holds_near_design_fraction() {
        let mut fleet = NuclearFleet::new(NuclearConfig::default());
        for _ in 0..10_000 {
            fleet.step(NuclearDispatchMode::MustRun, 0.0, 0.0, 1.0);
        }
        let expected = fleet.capacity_mw() * 0.98;
        assert!((fleet.total_mw() - expected).abs() < 1.0);
    }

    #[test]
    fn never_below_min_stable() {
        let mut fleet = NuclearFleet::new(NuclearConfig::default());
        for _ in 0..50_000 {
            fleet.step(NuclearDispatchMode::FollowFleetSchedule, 0.0, 0.0, 1.0);
        }
        assert!(fleet.total_mw() >= fleet.min_stable_mw() - 1.0);
    }

    #[test]
    fn ramp_is_bounded_per_tick() {
        let mut fleet = NuclearFleet::new(NuclearConfig::default());
        let before = fleet.total_mw();
        fleet.step(NuclearDispatchMode::FollowFleetSchedule, 0.0, 0.0, 1.0);
        let after = fleet.total_mw();
        let max_step = fleet.config.fleet_ramp_mw_per_s * 1.0 + 1e-3;
        assert!((after - before).abs() <= max_step);
    }
}
