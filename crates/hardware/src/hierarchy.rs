//! Multi-level access coordination.
//!
//! A [`CacheHierarchy`] owns up to three caches: an L1 instruction cache, an L1
//! data cache and a unified L2. Every access is resolved in a single pass:
//! 1. The access type selects the L1 cache; the address is decoded against it and looked up.
//! 2. The L1 per-set counters are updated (load/store split for the data cache).
//! 3. On an L1 hit the access is done.
//! 4. On an L1 miss, and only if L2 lookups are enabled, the same address is looked
//!    up in L2 and the L2 counters are updated. L2 has no lower level.
//!
//! An access whose L1 cache is absent skips straight to step 4 without touching
//! any L1 counter. Nothing is retried.

use serde::Serialize;

use crate::cache::{Cache, CacheGeometry, CacheRole, Fill, Lookup};
use crate::common::{AccessType, CacheFault, ConfigError, PhysAddr};
use crate::config::{CacheConfig, CacheHierarchyConfig};
use crate::stats::HierarchyStats;

/// Result of one access through the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AccessOutcome {
    /// L1 result; `None` when the L1 cache for this access type is absent.
    pub l1: Option<Lookup>,
    /// L2 result; `None` when L2 was not consulted.
    pub l2: Option<Lookup>,
}

impl AccessOutcome {
    /// Returns `true` when the access hit in L1.
    pub fn l1_hit(&self) -> bool {
        self.l1.is_some_and(|l| l.is_hit())
    }

    /// Returns `true` when some level served the access.
    pub fn is_hit(&self) -> bool {
        self.l1_hit() || self.l2.is_some_and(|l| l.is_hit())
    }
}

/// Cache targeted by a cache-control operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTarget {
    /// The L1 instruction cache.
    Instruction,
    /// The L1 data cache.
    Data,
    /// The unified L2 cache.
    Secondary,
}

/// Explicit cache-control operations issued by software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOp {
    /// Invalidate the line named by the address's index field (way bits included).
    IndexInvalidate,
    /// Invalidate the line holding the address, if resident.
    HitInvalidate,
    /// Bring the block containing the address into the cache.
    Fill,
    /// Bring the block in and lock it against eviction.
    FetchLock,
}

/// Result of a cache-control operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// An invalidation ran; `true` when a resident line was removed.
    Invalidated(bool),
    /// A fill or fetch-and-lock ran.
    Filled(Fill),
}

/// The complete simulated cache hierarchy.
#[derive(Debug)]
pub struct CacheHierarchy {
    icache: Option<Cache>,
    dcache: Option<Cache>,
    l2: Option<Cache>,
    l2_enabled: bool,
}

impl CacheHierarchy {
    /// Builds every configured cache and checks the hierarchy constraints.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any geometry is rejected, if L2 is enabled
    /// without an L2 cache, or if the L2 line is smaller than an L1 line.
    pub fn new(config: &CacheHierarchyConfig) -> Result<Self, ConfigError> {
        let build = |role: CacheRole, cfg: Option<&CacheConfig>| {
            cfg.map(|cfg| {
                let geometry = if config.strict_limits {
                    CacheGeometry::new(cfg, role.level())?
                } else {
                    CacheGeometry::relaxed(cfg, role.level())?
                };
                Ok::<_, ConfigError>(Cache::with_geometry(role, geometry, config.seed))
            })
            .transpose()
        };

        Self::from_caches(
            build(CacheRole::Instruction, config.l1_i.as_ref())?,
            build(CacheRole::Data, config.l1_d.as_ref())?,
            build(CacheRole::Secondary, config.l2.as_ref())?,
            config.l2_enabled,
        )
    }

    /// Assembles a hierarchy from caches built elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingL2`] or [`ConfigError::L2LineTooSmall`] when
    /// `l2_enabled` is set and the L2 cache is absent or too narrow.
    pub fn from_caches(
        icache: Option<Cache>,
        dcache: Option<Cache>,
        l2: Option<Cache>,
        l2_enabled: bool,
    ) -> Result<Self, ConfigError> {
        let hierarchy = Self {
            icache,
            dcache,
            l2,
            l2_enabled,
        };
        if l2_enabled {
            hierarchy.check_l2()?;
        }
        Ok(hierarchy)
    }

    /// Turns L2 lookups on or off.
    ///
    /// # Errors
    ///
    /// Enabling fails under the same conditions as [`CacheHierarchy::from_caches`];
    /// the flag is left unchanged in that case.
    pub fn set_l2_enabled(&mut self, enabled: bool) -> Result<(), ConfigError> {
        if enabled {
            self.check_l2()?;
        }
        self.l2_enabled = enabled;
        Ok(())
    }

    fn check_l2(&self) -> Result<(), ConfigError> {
        let l2_words = self
            .l2
            .as_ref()
            .ok_or(ConfigError::MissingL2)?
            .geometry()
            .words_per_line();
        for l1 in [&self.icache, &self.dcache].into_iter().flatten() {
            let l1_words = l1.geometry().words_per_line();
            if l2_words < l1_words {
                return Err(ConfigError::L2LineTooSmall {
                    l1: l1.role().label(),
                    l1_words,
                    l2_words,
                });
            }
        }
        Ok(())
    }

    /// Resolves one memory access through L1 and, on a miss, L2.
    ///
    /// # Errors
    ///
    /// Returns the first [`CacheFault`] raised by a policy. The faulting level's
    /// counters are not updated and lower levels are not consulted.
    pub fn access(&mut self, addr: PhysAddr, kind: AccessType) -> Result<AccessOutcome, CacheFault> {
        let l1 = if kind.is_data() {
            self.dcache.as_mut()
        } else {
            self.icache.as_mut()
        };

        let mut outcome = AccessOutcome::default();
        if let Some(cache) = l1 {
            let lookup = cache.access(addr, kind)?;
            outcome.l1 = Some(lookup);
            if lookup.is_hit() {
                return Ok(outcome);
            }
        }

        if self.l2_enabled {
            if let Some(l2) = self.l2.as_mut() {
                outcome.l2 = Some(l2.access(addr, kind)?);
            }
        }
        Ok(outcome)
    }

    /// Runs a cache-control operation against one cache.
    ///
    /// Returns `Ok(None)` if the target cache is not configured. Counters are
    /// never updated by control operations.
    ///
    /// # Errors
    ///
    /// Propagates [`CacheFault`] from the target's policy.
    pub fn control(
        &mut self,
        target: CacheTarget,
        op: CacheOp,
        addr: PhysAddr,
    ) -> Result<Option<ControlOutcome>, CacheFault> {
        let Some(cache) = self.cache_mut(target) else {
            return Ok(None);
        };
        let outcome = match op {
            CacheOp::IndexInvalidate => ControlOutcome::Invalidated(cache.invalidate_index(addr)),
            CacheOp::HitInvalidate => ControlOutcome::Invalidated(cache.hit_invalidate(addr)?),
            CacheOp::Fill => ControlOutcome::Filled(cache.fill(addr)?),
            CacheOp::FetchLock => ControlOutcome::Filled(cache.fetch_lock(addr)?),
        };
        Ok(Some(outcome))
    }

    /// The cache selected by `target`, if configured.
    pub const fn cache(&self, target: CacheTarget) -> Option<&Cache> {
        match target {
            CacheTarget::Instruction => self.icache.as_ref(),
            CacheTarget::Data => self.dcache.as_ref(),
            CacheTarget::Secondary => self.l2.as_ref(),
        }
    }

    fn cache_mut(&mut self, target: CacheTarget) -> Option<&mut Cache> {
        match target {
            CacheTarget::Instruction => self.icache.as_mut(),
            CacheTarget::Data => self.dcache.as_mut(),
            CacheTarget::Secondary => self.l2.as_mut(),
        }
    }

    /// The L1 instruction cache.
    pub const fn icache(&self) -> Option<&Cache> {
        self.icache.as_ref()
    }

    /// The L1 data cache.
    pub const fn dcache(&self) -> Option<&Cache> {
        self.dcache.as_ref()
    }

    /// The unified L2 cache.
    pub const fn l2(&self) -> Option<&Cache> {
        self.l2.as_ref()
    }

    /// Whether L1 misses are looked up in L2.
    pub const fn l2_enabled(&self) -> bool {
        self.l2_enabled
    }

    /// Totals for every configured cache.
    pub fn stats(&self) -> HierarchyStats {
        let summary = |cache: &Cache| cache.stats().summary(cache.role());
        HierarchyStats {
            icache: self.icache.as_ref().map(summary),
            dcache: self.dcache.as_ref().map(summary),
            l2: self.l2.as_ref().map(summary),
        }
    }

    /// Zeroes the counters of every cache.
    pub fn reset_stats(&mut self) {
        for cache in [&mut self.icache, &mut self.dcache, &mut self.l2]
            .into_iter()
            .flatten()
        {
            cache.reset_stats();
        }
    }
}
