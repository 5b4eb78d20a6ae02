//! A single Ornstein–Uhlenbeck mean-reverting process, forward-Euler stepped.

use rand::rngs::StdRng;

use crate::rng::gaussian_noise;

/// `x ← x + (target − x)·(dt/τ) + σ·√dt·N(0,1)`, clamped to `[lo, hi]` after
/// each step (spec §4.2, §8 invariant 8: every OU integrator is bounded).
#[derive(Debug, Clone, Copy)]
pub struct OuProcess {
    value: f32,
    tau_s: f32,
    sigma: f32,
    lo: f32,
    hi: f32,
}

impl OuProcess {
    pub fn new(initial: f32, tau_s: f32, sigma: f32, lo: f32, hi: f32) -> Self {
        Self {
            value: initial.clamp(lo, hi),
            tau_s,
            sigma,
            lo,
            hi,
        }
    }

    pub fn value(self) -> f32 {
        self.value
    }

    /// Advances one second, reverting toward `target`.
    pub fn step(&mut self, target: f32, dt_s: f32, rng: &mut StdRng) {
        let reversion = (target - self.value) * (dt_s / self.tau_s);
        let noise = gaussian_noise(rng, self.sigma) * dt_s.sqrt();
        self.value = (self.value + reversion + noise).clamp(self.lo, self.hi);
    }
}

/// Two-state Markov process (off/on) with per-second start/stop
/// probabilities, used for the snow on/off state (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkovSwitch {
    on: bool,
}

impl MarkovSwitch {
    pub fn new(initial_on: bool) -> Self {
        Self { on: initial_on }
    }

    pub fn on(self) -> bool {
        self.on
    }

    /// `p_start` applies when off, `p_stop` when on; both are per-second
    /// probabilities of transition.
    pub fn step(&mut self, p_start: f32, p_stop: f32, rng: &mut StdRng) {
        use rand::Rng;
        let roll: f32 = rng.random();
        if self.on {
            if roll < p_stop {
                self.on = false;
            }
        } else if roll < p_start {
            self.on = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::child_rng;
    use crate::rng::SeedTag;

    #[test]
    fn ou_process_stays_within_clamp() {
        let mut rng = child_rng(1, SeedTag::SynopticWeather);
        let mut p = OuProcess::new(0.0, 600.0, 5.0, -1.0, 1.0);
        for _ in 0..10_000 {
            p.step(0.0, 1.0, &mut rng);
            assert!(p.value() >= -1.0 && p.value() <= 1.0);
        }
    }

    #[test]
    fn ou_process_reverts_toward_target_on_average() {
        let mut rng = child_rng(7, SeedTag::SynopticWeather);
        let mut p = OuProcess::new(-50.0, 300.0, 0.01, -100.0, 100.0);
        for _ in 0..5_000 {
            p.step(10.0, 1.0, &mut rng);
        }
        assert!(p.value() > -50.0);
    }

    #[test]
    fn markov_switch_mostly_off_with_tiny_start_prob() {
        let mut rng = child_rng(3, SeedTag::Snow);
        let mut sw = MarkovSwitch::new(false);
        let mut on_ticks = 0;
        for _ in 0..100_000 {
            sw.step(2e-5, 2e-4, &mut rng);
            if sw.on() {
                on_ticks += 1;
            }
        }
        assert!(on_ticks < 50_000);
    }
}
