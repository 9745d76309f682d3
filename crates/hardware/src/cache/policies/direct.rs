//! Direct-Mapped Placement.
//!
//! Each address maps to exactly one line, so there is no victim choice and no
//! metadata to maintain. A locked line simply refuses the new tag.

use super::{check_unlocked, install, Fill, Lookup, ReplacementPolicy};
use crate::cache::geometry::SetRef;
use crate::cache::CacheLine;
use crate::common::CacheFault;

/// Direct-mapped policy; stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectMappedPolicy;

impl DirectMappedPolicy {
    /// Creates a new direct-mapped policy instance.
    pub const fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for DirectMappedPolicy {
    fn name(&self) -> &'static str {
        "dm"
    }

    fn touch(&mut self, _lines: &mut [CacheLine], _set: SetRef<'_>, _way: usize) {}

    fn reset(&mut self, _lines: &mut [CacheLine], _set: SetRef<'_>, _way: usize) {}

    fn select_victim(&mut self, _lines: &[CacheLine], _set: SetRef<'_>, candidates: &[usize]) -> usize {
        candidates[0]
    }

    /// Hits if the single line holds `tag`; otherwise overwrites it unless locked.
    fn lookup(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, tag: u64) -> Result<Lookup, CacheFault> {
        let index = set.line(0);
        let line = &mut lines[index];
        if line.valid && line.tag == tag {
            return Ok(Lookup::Hit { way: 0 });
        }
        check_unlocked(line, index, 0)?;
        if line.locked {
            tracing::warn!(index, "line locked");
            return Ok(Lookup::Miss { way: None });
        }
        install(line, tag);
        Ok(Lookup::Miss { way: Some(0) })
    }

    fn fill_line(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, tag: u64) -> Result<Fill, CacheFault> {
        let index = set.line(0);
        let line = &mut lines[index];
        check_unlocked(line, index, 0)?;
        if line.locked {
            tracing::warn!(index, "line locked");
            return Ok(Fill::Locked);
        }
        install(line, tag);
        Ok(Fill::Filled { way: 0 })
    }

    /// Fills the line, then locks it. A line that is already locked is left as is.
    fn fetch_lock(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, tag: u64) -> Result<Fill, CacheFault> {
        let fill = self.fill_line(lines, set, tag)?;
        if let Fill::Filled { way } = fill {
            lines[set.line(way)].locked = true;
        }
        Ok(fill)
    }
}
