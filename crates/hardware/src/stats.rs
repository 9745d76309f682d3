//! Cache statistics collection and reporting.
//!
//! This module tracks hit/miss counts for every cache in the hierarchy. It provides:
//! 1. **Per-set counters:** One hit and one miss counter per base set index, so
//!    sets (not individual ways) are the unit of reporting.
//! 2. **Load/store split:** The data cache keeps separate counter pairs for loads and stores.
//! 3. **Summaries:** Totals and miss rates per cache, serialisable for external tools.

use std::fmt;

use serde::Serialize;

use crate::cache::CacheRole;
use crate::common::AccessType;

/// Hit and miss counters indexed by base set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetCounters {
    /// Hits per set.
    pub hits: Vec<u64>,
    /// Misses per set.
    pub misses: Vec<u64>,
}

impl SetCounters {
    /// Creates zeroed counters for `sets` sets.
    pub fn new(sets: usize) -> Self {
        Self {
            hits: vec![0; sets],
            misses: vec![0; sets],
        }
    }

    /// Counts one access to `set`.
    #[inline]
    pub fn record(&mut self, set: usize, hit: bool) {
        if hit {
            self.hits[set] += 1;
        } else {
            self.misses[set] += 1;
        }
    }

    /// Sum of all hit counters.
    pub fn total_hits(&self) -> u64 {
        self.hits.iter().sum()
    }

    /// Sum of all miss counters.
    pub fn total_misses(&self) -> u64 {
        self.misses.iter().sum()
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        self.hits.fill(0);
        self.misses.fill(0);
    }
}

/// Counter layout of one cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CacheStats {
    /// A single hit/miss pair per set (instruction and L2 caches).
    Unified(SetCounters),
    /// Separate load and store pairs per set (data cache).
    Split {
        /// Counters for loads.
        load: SetCounters,
        /// Counters for stores.
        store: SetCounters,
    },
}

impl CacheStats {
    /// Creates the counter layout used by `role`.
    pub fn for_role(role: CacheRole, sets: usize) -> Self {
        match role {
            CacheRole::Data => Self::Split {
                load: SetCounters::new(sets),
                store: SetCounters::new(sets),
            },
            CacheRole::Instruction | CacheRole::Secondary => Self::Unified(SetCounters::new(sets)),
        }
    }

    /// Counts one access of type `kind` to `set`.
    #[inline]
    pub fn record(&mut self, set: usize, kind: AccessType, hit: bool) {
        match self {
            Self::Unified(counters) => counters.record(set, hit),
            Self::Split { store, .. } if kind == AccessType::Store => store.record(set, hit),
            Self::Split { load, .. } => load.record(set, hit),
        }
    }

    /// Total hits over every set (and both halves of a split layout).
    pub fn hits(&self) -> u64 {
        match self {
            Self::Unified(counters) => counters.total_hits(),
            Self::Split { load, store } => load.total_hits() + store.total_hits(),
        }
    }

    /// Total misses over every set (and both halves of a split layout).
    pub fn misses(&self) -> u64 {
        match self {
            Self::Unified(counters) => counters.total_misses(),
            Self::Split { load, store } => load.total_misses() + store.total_misses(),
        }
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        match self {
            Self::Unified(counters) => counters.reset(),
            Self::Split { load, store } => {
                load.reset();
                store.reset();
            }
        }
    }

    /// Totals for reporting.
    pub fn summary(&self, role: CacheRole) -> CacheSummary {
        let split = match self {
            Self::Unified(_) => None,
            Self::Split { load, store } => Some(SplitSummary {
                load_hits: load.total_hits(),
                load_misses: load.total_misses(),
                store_hits: store.total_hits(),
                store_misses: store.total_misses(),
            }),
        };
        CacheSummary {
            name: role.label(),
            hits: self.hits(),
            misses: self.misses(),
            split,
        }
    }
}

/// Load/store totals of a data cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    /// Load hits.
    pub load_hits: u64,
    /// Load misses.
    pub load_misses: u64,
    /// Store hits.
    pub store_hits: u64,
    /// Store misses.
    pub store_misses: u64,
}

/// Totals of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    /// Report label (`L1-I`, `L1-D`, `L2`).
    pub name: &'static str,
    /// Total hits.
    pub hits: u64,
    /// Total misses.
    pub misses: u64,
    /// Load/store breakdown, data cache only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitSummary>,
}

impl CacheSummary {
    /// Hits plus misses.
    pub const fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Miss rate in percent; zero when the cache saw no accesses.
    pub fn miss_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            (self.misses as f64 / total as f64) * 100.0
        }
    }
}

/// Snapshot of every cache in a hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HierarchyStats {
    /// Instruction cache totals.
    pub icache: Option<CacheSummary>,
    /// Data cache totals.
    pub dcache: Option<CacheSummary>,
    /// L2 totals.
    pub l2: Option<CacheSummary>,
}

impl HierarchyStats {
    /// Prints the summary table to stdout.
    pub fn print(&self) {
        print!("{self}");
    }
}

impl fmt::Display for HierarchyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "CACHE SIMULATION STATISTICS")?;
        writeln!(f, "==========================================================")?;
        for summary in [self.icache, self.dcache, self.l2].into_iter().flatten() {
            writeln!(
                f,
                "  {:<6} accesses: {:<10} | hits: {:<10} | miss_rate: {:.2}%",
                summary.name,
                summary.accesses(),
                summary.hits,
                summary.miss_rate()
            )?;
            if let Some(split) = summary.split {
                writeln!(f, "         loads  hit/miss: {} / {}", split.load_hits, split.load_misses)?;
                writeln!(f, "         stores hit/miss: {} / {}", split.store_hits, split.store_misses)?;
            }
        }
        writeln!(f, "==========================================================")
    }
}
