//! Cache Replacement Policies.
//!
//! Every policy resolves lookups, fills, locks and invalidations against the
//! shared line store of one cache. The set to operate on is described by a
//! [`SetRef`]: a base index plus the way-mask table.
//!
//! # Policies
//!
//! - `DirectMapped`: a single candidate line; no victim choice.
//! - `Lru`: Least Recently Used, tracked as a per-line recency rank.
//! - `Lfu`: Least Frequently Used, tracked as a per-line access count.
//! - `Random`: uniform choice among unlocked lines.
//!
//! # Victim selection
//!
//! On a miss the set is scanned once. A valid line with the requested tag is a
//! hit. Otherwise the first invalid way (in way order) receives the new tag. With
//! no invalid way, the policy chooses among the valid, unlocked ways. When every
//! way is valid and locked nothing is written and the miss is reported without a
//! way.
//!
//! A line that is locked but not valid aborts the operation with
//! [`CacheFault::InvalidLocked`].

/// Direct-mapped (single way) policy.
pub mod direct;

/// Least Frequently Used replacement policy.
pub mod lfu;

/// Least Recently Used replacement policy.
pub mod lru;

/// Random replacement policy.
pub mod random;

pub use direct::DirectMappedPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;

use std::fmt;

use serde::Serialize;

use super::geometry::{CacheGeometry, SetRef};
use super::CacheLine;
use crate::common::CacheFault;
use crate::config::ReplacementPolicy as PolicyType;

/// Largest associativity supported by the model.
pub const MAX_WAYS: usize = 4;

/// Outcome of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Lookup {
    /// The tag was present in `way`.
    Hit {
        /// Way that served the access.
        way: usize,
    },
    /// The tag was absent; `way` received it, or `None` if the set was fully locked.
    Miss {
        /// Way that was filled, if any.
        way: Option<usize>,
    },
}

impl Lookup {
    /// Returns `true` for a hit.
    #[inline]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }

    /// Way that served or received the access.
    #[inline]
    pub const fn way(&self) -> Option<usize> {
        match *self {
            Self::Hit { way } => Some(way),
            Self::Miss { way } => way,
        }
    }
}

/// Outcome of an explicit fill or fetch-and-lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fill {
    /// The tag now occupies `way`.
    Filled {
        /// Way that holds the tag.
        way: usize,
    },
    /// Every candidate line was locked; nothing changed.
    Locked,
}

/// Valid, unlocked ways of a set that did not hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Candidates {
    ways: [usize; MAX_WAYS],
    len: usize,
}

impl Candidates {
    fn push(&mut self, way: usize) {
        self.ways[self.len] = way;
        self.len += 1;
    }

    /// Candidate ways, in way order.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.ways[..self.len]
    }

    /// Returns `true` when no way can be evicted.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// What a single pass over a set found.
#[derive(Debug, Clone, Copy)]
enum SetScan {
    Hit(usize),
    Free(usize),
    Evict(Candidates),
    Full,
}

/// Scans every way of `set`, checking the valid/locked invariant on each line.
///
/// A hit anywhere in the set takes precedence over a free way.
fn scan_set(lines: &[CacheLine], set: SetRef<'_>, tag: u64) -> Result<SetScan, CacheFault> {
    let mut free = None;
    let mut candidates = Candidates::default();

    for way in 0..set.ways() {
        let index = set.line(way);
        let line = &lines[index];
        if line.valid {
            if line.tag == tag {
                return Ok(SetScan::Hit(way));
            }
            if !line.locked {
                candidates.push(way);
            }
        } else {
            check_unlocked(line, index, way)?;
            if free.is_none() {
                free = Some(way);
            }
        }
    }

    Ok(match free {
        Some(way) => SetScan::Free(way),
        None if candidates.is_empty() => SetScan::Full,
        None => SetScan::Evict(candidates),
    })
}

/// Fails with [`CacheFault::InvalidLocked`] if an invalid line carries a lock.
#[inline]
pub(crate) fn check_unlocked(line: &CacheLine, index: usize, way: usize) -> Result<(), CacheFault> {
    if !line.valid && line.locked {
        tracing::error!(line = index, way, "cache line invalid and locked");
        return Err(CacheFault::InvalidLocked { line: index, way });
    }
    Ok(())
}

/// Writes `tag` into a line and marks it valid. Lock state is left alone.
#[inline]
fn install(line: &mut CacheLine, tag: u64) {
    line.tag = tag;
    line.valid = true;
}

/// Picks the candidate with the smallest metadata, the lowest way winning ties.
pub(crate) fn least_metadata(lines: &[CacheLine], set: SetRef<'_>, candidates: &[usize]) -> usize {
    let mut best = candidates[0];
    for &way in &candidates[1..] {
        if lines[set.line(way)].metadata < lines[set.line(best)].metadata {
            best = way;
        }
    }
    best
}

/// Trait for cache replacement policies.
///
/// Implementors supply the policy-specific hooks (`touch`, `reset`,
/// `select_victim`); the operations themselves are provided and shared by
/// every associative policy. The direct-mapped policy overrides them with
/// single-line versions.
pub trait ReplacementPolicy: fmt::Debug + Send + Sync {
    /// Short name of the policy, as used in geometry strings.
    fn name(&self) -> &'static str;

    /// Updates metadata when `way` is hit.
    fn touch(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, way: usize);

    /// Updates metadata when `way` receives a new tag.
    fn reset(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, way: usize);

    /// Chooses a victim among valid, unlocked ways. `candidates` is never empty.
    fn select_victim(&mut self, lines: &[CacheLine], set: SetRef<'_>, candidates: &[usize]) -> usize;

    /// Looks `tag` up in `set`, filling a way on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`CacheFault::InvalidLocked`] if any candidate line is locked but invalid.
    fn lookup(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, tag: u64) -> Result<Lookup, CacheFault> {
        let way = match scan_set(lines, set, tag)? {
            SetScan::Hit(way) => {
                self.touch(lines, set, way);
                return Ok(Lookup::Hit { way });
            }
            SetScan::Free(way) => way,
            SetScan::Evict(candidates) => self.select_victim(lines, set, candidates.as_slice()),
            SetScan::Full => {
                tracing::warn!(index = set.base, "all cache lines locked for index");
                return Ok(Lookup::Miss { way: None });
            }
        };
        install(&mut lines[set.line(way)], tag);
        self.reset(lines, set, way);
        Ok(Lookup::Miss { way: Some(way) })
    }

    /// Clears valid, lock and metadata of the physical line `index`.
    fn invalidate(&mut self, lines: &mut [CacheLine], index: usize) {
        lines[index] = CacheLine::default();
    }

    /// Invalidates the way of `set` holding `tag`, if any.
    ///
    /// Returns `true` when a line was invalidated.
    ///
    /// # Errors
    ///
    /// Returns [`CacheFault::InvalidLocked`] if any candidate line is locked but invalid.
    fn hit_invalidate(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, tag: u64) -> Result<bool, CacheFault> {
        let mut hit = None;
        for way in 0..set.ways() {
            let index = set.line(way);
            check_unlocked(&lines[index], index, way)?;
            if hit.is_none() && lines[index].valid && lines[index].tag == tag {
                hit = Some(index);
            }
        }
        if let Some(index) = hit {
            lines[index] = CacheLine::default();
            return Ok(true);
        }
        Ok(false)
    }

    /// Places `tag` in `set` without counting it as an access.
    ///
    /// A way already holding `tag` is treated as a hit and only has its
    /// metadata touched; otherwise victim selection follows the miss path of
    /// [`lookup`](Self::lookup).
    ///
    /// # Errors
    ///
    /// Returns [`CacheFault::InvalidLocked`] if any candidate line is locked but invalid.
    fn fill_line(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, tag: u64) -> Result<Fill, CacheFault> {
        let way = match scan_set(lines, set, tag)? {
            SetScan::Hit(way) => {
                self.touch(lines, set, way);
                return Ok(Fill::Filled { way });
            }
            SetScan::Free(way) => way,
            SetScan::Evict(candidates) => self.select_victim(lines, set, candidates.as_slice()),
            SetScan::Full => {
                tracing::warn!(index = set.base, "all cache lines locked for index");
                return Ok(Fill::Locked);
            }
        };
        install(&mut lines[set.line(way)], tag);
        self.reset(lines, set, way);
        Ok(Fill::Filled { way })
    }

    /// Looks `tag` up and locks the line that ends up holding it.
    ///
    /// # Errors
    ///
    /// Returns [`CacheFault::InvalidLocked`] if any candidate line is locked but invalid.
    fn fetch_lock(&mut self, lines: &mut [CacheLine], set: SetRef<'_>, tag: u64) -> Result<Fill, CacheFault> {
        match self.lookup(lines, set, tag)?.way() {
            Some(way) => {
                lines[set.line(way)].locked = true;
                Ok(Fill::Filled { way })
            }
            None => Ok(Fill::Locked),
        }
    }
}

/// Creates the policy object for a geometry.
///
/// Direct-mapped geometries always get [`DirectMappedPolicy`]; associative
/// ones get the configured policy. `seed` only matters for random replacement.
pub fn build(geometry: &CacheGeometry, seed: u64) -> Box<dyn ReplacementPolicy> {
    match geometry.policy() {
        _ if geometry.ways() == 1 => Box::new(DirectMappedPolicy::new()),
        Some(PolicyType::Lfu) => Box::new(LfuPolicy::new()),
        Some(PolicyType::Random) => Box::new(RandomPolicy::new(geometry.ways(), seed)),
        Some(PolicyType::Lru) | None => Box::new(LruPolicy::new(geometry.ways())),
    }
}
