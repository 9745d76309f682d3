//! Cache line store and per-cache operations.
//!
//! A [`Cache`] owns a flat array of [`CacheLine`]s, the validated
//! [`CacheGeometry`] describing it, its replacement policy and its per-set
//! counters. Only tags, validity, locks and policy metadata are modelled; no
//! data bytes are stored.

/// Geometry validation and address decoding.
pub mod geometry;

/// Replacement policy implementations (direct-mapped, LRU, LFU, random).
pub mod policies;

pub use geometry::{CacheGeometry, SetRef};
pub use policies::{Fill, Lookup, ReplacementPolicy};

use std::fmt;

use serde::Serialize;

use crate::common::{AccessType, CacheFault, ConfigError, PhysAddr};
use crate::config::{CacheConfig, CacheLevel};
use crate::stats::CacheStats;

/// One cache line: tag, validity, lock and policy metadata.
///
/// `metadata` holds the recency rank under LRU and the hit count under LFU; the
/// other policies leave it at zero. An invalid line is never locked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheLine {
    /// Address bits above the offset and index fields.
    pub tag: u64,
    /// The line holds a block.
    pub valid: bool,
    /// The line may not be chosen as a victim.
    pub locked: bool,
    /// Policy-specific bookkeeping.
    pub metadata: u32,
}

/// Position of a cache in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CacheRole {
    /// L1 instruction cache.
    Instruction,
    /// L1 data cache.
    Data,
    /// Unified L2 cache.
    Secondary,
}

impl CacheRole {
    /// Level whose limits apply to this cache.
    pub const fn level(self) -> CacheLevel {
        match self {
            Self::Instruction | Self::Data => CacheLevel::L1,
            Self::Secondary => CacheLevel::L2,
        }
    }

    /// Short label used in reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Instruction => "L1-I",
            Self::Data => "L1-D",
            Self::Secondary => "L2",
        }
    }

    /// Offset mixed into the hierarchy seed so caches draw independent streams.
    const fn seed_offset(self) -> u64 {
        match self {
            Self::Instruction => 1,
            Self::Data => 2,
            Self::Secondary => 3,
        }
    }
}

impl fmt::Display for CacheRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single simulated cache.
#[derive(Debug)]
pub struct Cache {
    role: CacheRole,
    geometry: CacheGeometry,
    lines: Vec<CacheLine>,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
}

impl Cache {
    /// Creates a cache from a user configuration, enforcing the role's size limits.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry is rejected.
    pub fn new(role: CacheRole, config: &CacheConfig, seed: u64) -> Result<Self, ConfigError> {
        let geometry = CacheGeometry::new(config, role.level())?;
        Ok(Self::with_geometry(role, geometry, seed))
    }

    /// Creates a cache from an already validated geometry.
    ///
    /// All lines start invalid and unlocked; all counters start at zero.
    pub fn with_geometry(role: CacheRole, geometry: CacheGeometry, seed: u64) -> Self {
        let policy = policies::build(&geometry, seed.wrapping_add(role.seed_offset()));
        tracing::debug!(
            cache = role.label(),
            lines = geometry.line_count(),
            words_per_line = geometry.words_per_line(),
            ways = geometry.ways(),
            policy = policy.name(),
            "cache configured"
        );
        Self {
            role,
            lines: vec![CacheLine::default(); geometry.line_count()],
            stats: CacheStats::for_role(role, geometry.lines_per_way()),
            geometry,
            policy,
        }
    }

    /// Resolves an access and records it in the per-set counters.
    ///
    /// # Errors
    ///
    /// Propagates [`CacheFault`] from the policy; counters are untouched in that case.
    pub fn access(&mut self, addr: PhysAddr, kind: AccessType) -> Result<Lookup, CacheFault> {
        let decoded = self.geometry.decode(addr);
        let outcome = self.lookup_set(decoded.set, decoded.tag)?;
        self.stats.record(decoded.set, kind, outcome.is_hit());
        tracing::trace!(
            cache = self.role.label(),
            addr = addr.val(),
            set = decoded.set,
            tag = decoded.tag,
            hit = outcome.is_hit(),
            "access"
        );
        Ok(outcome)
    }

    /// Looks `tag` up in base set `set` without touching the counters.
    ///
    /// # Errors
    ///
    /// Propagates [`CacheFault`] from the policy.
    pub fn lookup_set(&mut self, set: usize, tag: u64) -> Result<Lookup, CacheFault> {
        self.policy.lookup(&mut self.lines, self.geometry.set(set), tag)
    }

    /// Clears the physical line named by the full index field of `addr`.
    ///
    /// Returns `true` if the line was valid.
    pub fn invalidate_index(&mut self, addr: PhysAddr) -> bool {
        let index = self.geometry.line_index(addr);
        self.invalidate_line(index)
    }

    /// Clears physical line `index`.
    ///
    /// Returns `true` if the line was valid. An index past the end of the line
    /// store changes nothing and returns `false`.
    pub fn invalidate_line(&mut self, index: usize) -> bool {
        let Some(was_valid) = self.lines.get(index).map(|line| line.valid) else {
            return false;
        };
        self.policy.invalidate(&mut self.lines, index);
        was_valid
    }

    /// Invalidates the line holding `addr`, if present.
    ///
    /// # Errors
    ///
    /// Propagates [`CacheFault`] from the policy.
    pub fn hit_invalidate(&mut self, addr: PhysAddr) -> Result<bool, CacheFault> {
        let decoded = self.geometry.decode(addr);
        self.policy
            .hit_invalidate(&mut self.lines, self.geometry.set(decoded.set), decoded.tag)
    }

    /// Fills the block containing `addr`.
    ///
    /// # Errors
    ///
    /// Propagates [`CacheFault`] from the policy.
    pub fn fill(&mut self, addr: PhysAddr) -> Result<Fill, CacheFault> {
        let decoded = self.geometry.decode(addr);
        self.policy
            .fill_line(&mut self.lines, self.geometry.set(decoded.set), decoded.tag)
    }

    /// Fills the block containing `addr` and locks it.
    ///
    /// # Errors
    ///
    /// Propagates [`CacheFault`] from the policy.
    pub fn fetch_lock(&mut self, addr: PhysAddr) -> Result<Fill, CacheFault> {
        let decoded = self.geometry.decode(addr);
        self.policy
            .fetch_lock(&mut self.lines, self.geometry.set(decoded.set), decoded.tag)
    }

    /// Returns `true` if the block containing `addr` is resident. Nothing is updated.
    pub fn contains(&self, addr: PhysAddr) -> bool {
        let decoded = self.geometry.decode(addr);
        let set = self.geometry.set(decoded.set);
        (0..set.ways()).any(|way| {
            let line = &self.lines[set.line(way)];
            line.valid && line.tag == decoded.tag
        })
    }

    /// Physical line `index`, if in range.
    pub fn line(&self, index: usize) -> Option<&CacheLine> {
        self.lines.get(index)
    }

    /// The whole line store.
    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// Position of this cache in the hierarchy.
    pub const fn role(&self) -> CacheRole {
        self.role
    }

    /// Geometry of this cache.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Name of the active replacement policy.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Per-set hit/miss counters.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Zeroes every counter; line state is kept.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}
