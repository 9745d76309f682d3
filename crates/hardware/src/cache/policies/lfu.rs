//! Least Frequently Used (LFU) Replacement Policy.
//!
//! Each line's metadata counts the hits it received since it was filled. The
//! victim is the unlocked line with the lowest count; ties go to the lowest way.

use super::{least_metadata, ReplacementPolicy};
use crate::cache::geometry::SetRef;
use crate::cache::CacheLine;

/// LFU policy; all state lives in the line metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct LfuPolicy;

impl LfuPolicy {
    /// Creates a new LFU policy instance.
    pub const fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for LfuPolicy {
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn touch(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, way: usize) {
        let line = &mut lines[set.line(way)];
        line.metadata = line.metadata.saturating_add(1);
    }

    fn reset(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, way: usize) {
        lines[set.line(way)].metadata = 0;
    }

    fn select_victim(&mut self, lines: &[CacheLine], set: SetRef<'_>, candidates: &[usize]) -> usize {
        least_metadata(lines, set, candidates)
    }
}
