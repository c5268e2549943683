//! Per-run random sources.
//!
//! Every generation run owns its own `RandomSource`; nothing here is global,
//! so two runs with the same seed draw the same sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform random draws used by the generators.
pub trait RandomSource {
    /// Uniform integer in `[min, max)`.
    ///
    /// Empty or inverted ranges collapse to `min` instead of panicking.
    fn range(&mut self, min: i32, max: i32) -> i32;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f32;

    /// Unweighted coin flip.
    fn coin_flip(&mut self) -> bool {
        self.unit() < 0.5
    }

    /// True with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p.clamp(0.0, 1.0)
    }
}

/// ChaCha8-backed random source. Portable: the same seed yields the same
/// draws on every platform.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { seed, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Seed from the OS entropy source. The chosen seed is kept so the run
    /// can be reproduced later.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    fn unit(&mut self) -> f32 {
        self.rng.gen_range(0.0f32..1.0)
    }
}
