//! Least Recently Used (LRU) Replacement Policy.
//!
//! Recency is stored in each line's metadata as a rank in `[0, ways - 1]`,
//! `ways - 1` being the most recently used. Touching a line moves it to the top
//! rank and shifts every line that was above it down by one, so the ranks of a
//! fully populated set stay a permutation.
//!
//! # Performance
//!
//! - **Time Complexity:** `touch()` and `select_victim()` are O(W)
//! - **Space Complexity:** no state beyond the line metadata
//! - **Best Case:** Accesses with good temporal locality
//! - **Worst Case:** Cyclic scans one line larger than the set (thrashing)

use super::{least_metadata, ReplacementPolicy};
use crate::cache::geometry::SetRef;
use crate::cache::CacheLine;

/// LRU policy state.
#[derive(Debug, Clone, Copy)]
pub struct LruPolicy {
    /// Rank given to the most recently used line.
    mru_rank: u32,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the cache.
    pub const fn new(ways: usize) -> Self {
        Self {
            mru_rank: ways.saturating_sub(1) as u32,
        }
    }

    /// Promotes `way` to the most recently used rank.
    fn promote(self, lines: &mut [CacheLine], set: SetRef<'_>, way: usize) {
        let old = lines[set.line(way)].metadata;
        if old == self.mru_rank {
            return;
        }
        for other in 0..set.ways() {
            let line = &mut lines[set.line(other)];
            if line.metadata > old {
                line.metadata -= 1;
            }
        }
        lines[set.line(way)].metadata = self.mru_rank;
    }
}

impl ReplacementPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn touch(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, way: usize) {
        self.promote(lines, set, way);
    }

    /// A newly filled line is the most recently used one.
    fn reset(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, way: usize) {
        self.promote(lines, set, way);
    }

    /// Evicts the unlocked line with the lowest rank.
    fn select_victim(&mut self, lines: &[CacheLine], set: SetRef<'_>, candidates: &[usize]) -> usize {
        least_metadata(lines, set, candidates)
    }
}
