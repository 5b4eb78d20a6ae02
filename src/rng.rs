//! Deterministic, splittable seeding for the per-component `StdRng`s.
//!
//! The source's stochastic components all pulled from one process-wide
//! `Math.random()`. For reproducibility (§8 S4), every stochastic component
//! gets its own `StdRng`, seeded from the master seed mixed with a stable
//! per-component tag so that adding or removing an unrelated component never
//! perturbs another's sequence.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Stable tags identifying each stochastic component, mixed into the master
/// seed via [`child_seed`]. Extend this list rather than reusing a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedTag {
    SynopticWeather,
    RegionalWind(u8),
    SolarSite(u8),
    Snow,
    ResidentialHeating,
    ResidentialOther,
    Services,
    Transport,
    Industry,
    GridLosses,
    RunOfRiverInflow,
}

impl SeedTag {
    fn discriminant(self) -> u64 {
        match self {
            Self::SynopticWeather => 1,
            Self::RegionalWind(i) => 0x1_00 | u64::from(i),
            Self::SolarSite(i) => 0x2_00 | u64::from(i),
            Self::Snow => 4,
            Self::ResidentialHeating => 5,
            Self::ResidentialOther => 6,
            Self::Services => 7,
            Self::Transport => 8,
            Self::Industry => 9,
            Self::GridLosses => 10,
            Self::RunOfRiverInflow => 11,
        }
    }
}

/// Splitmix64-style mix: cheap, well-distributed, and deterministic across
/// platforms (unlike relying on a `Hash` impl, which is not spec'd to be stable).
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derives a child seed for `tag` from the master `seed`. Same inputs always
/// produce the same child seed; different tags never collide.
pub fn child_seed(seed: u64, tag: SeedTag) -> u64 {
    splitmix64(seed ^ splitmix64(tag.discriminant()))
}

/// Builds a seeded `StdRng` for the given component tag.
pub fn child_rng(seed: u64, tag: SeedTag) -> StdRng {
    StdRng::seed_from_u64(child_seed(seed, tag))
}

/// Box–Muller standard-normal sample, scaled by `std_dev`. Grounded on
/// `vpp-sim::devices::types::gaussian_noise`, generalised to any `Rng`.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    use rand::Rng;
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_tag_is_deterministic() {
        assert_eq!(
            child_seed(42, SeedTag::Snow),
            child_seed(42, SeedTag::Snow)
        );
    }

    #[test]
    fn distinct_tags_diverge() {
        assert_ne!(
            child_seed(42, SeedTag::Snow),
            child_seed(42, SeedTag::SynopticWeather)
        );
    }

    #[test]
    fn distinct_indices_diverge() {
        assert_ne!(
            child_seed(42, SeedTag::RegionalWind(0)),
            child_seed(42, SeedTag::RegionalWind(1))
        );
    }

    #[test]
    fn different_seed_diverges() {
        assert_ne!(
            child_seed(42, SeedTag::Snow),
            child_seed(43, SeedTag::Snow)
        );
    }
}
