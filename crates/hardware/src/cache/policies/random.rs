//! Random Replacement Policy.
//!
//! Victims are drawn uniformly from the unlocked ways. A way index is drawn over
//! the whole way range and redrawn until it names an unlocked way, which keeps
//! the choice uniform over whatever subset is unlocked. With a single unlocked
//! way no draw is made.
//!
//! The generator is a seeded `ChaCha8Rng`, so a run is reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::ReplacementPolicy;
use crate::cache::geometry::SetRef;
use crate::cache::CacheLine;

/// Random policy state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    /// Number of ways in the cache.
    ways: usize,
    /// Deterministic generator.
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the cache.
    /// * `seed` - Seed for the generator.
    pub fn new(ways: usize, seed: u64) -> Self {
        Self {
            ways: ways.max(1),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "rnd"
    }

    fn touch(&mut self, _lines: &mut [CacheLine], _set: SetRef<'_>, _way: usize) {}

    fn reset(&mut self, _lines: &mut [CacheLine], _set: SetRef<'_>, _way: usize) {}

    fn select_victim(&mut self, _lines: &[CacheLine], _set: SetRef<'_>, candidates: &[usize]) -> usize {
        if let [only] = candidates {
            return *only;
        }
        loop {
            let way = self.rng.gen_range(0..self.ways);
            if candidates.contains(&way) {
                return way;
            }
        }
    }
}
