//! Cache Simulation Tests.
//!
//! Exercises a single `Cache`: hit/miss classification, per-set counters, the
//! control operations and construction from user configuration.

use cachesim_core::cache::{Cache, CacheRole, Fill, Lookup};
use cachesim_core::common::{AccessType, ConfigError, PhysAddr};
use cachesim_core::config::{Associativity, ReplacementPolicy};
use cachesim_core::stats::CacheStats;
use pretty_assertions::assert_eq;

use crate::common::{addr_for, data_cache, set_tags, tiny_cache, TEST_SEED};

fn load_counters(cache: &Cache) -> (&[u64], &[u64]) {
    match cache.stats() {
        CacheStats::Split { load, .. } => (load.hits.as_slice(), load.misses.as_slice()),
        CacheStats::Unified(c) => (c.hits.as_slice(), c.misses.as_slice()),
    }
}

#[test]
fn new_cache_is_empty() {
    let cache = tiny_cache(Associativity::TwoWay, Some(ReplacementPolicy::Lru));
    assert_eq!(cache.lines().len(), 64);
    assert!(cache.lines().iter().all(|l| !l.valid && !l.locked && l.metadata == 0));
    assert_eq!(cache.stats().hits(), 0);
    assert_eq!(cache.stats().misses(), 0);
    assert_eq!(cache.role(), CacheRole::Data);
    assert_eq!(cache.policy_name(), "lru");
}

#[test]
fn repeated_access_hits() {
    let mut cache = tiny_cache(Associativity::DirectMapped, None);
    let addr = PhysAddr::new(0x1234);

    assert_eq!(cache.access(addr, AccessType::Load).unwrap(), Lookup::Miss { way: Some(0) });
    assert_eq!(cache.access(addr, AccessType::Load).unwrap(), Lookup::Hit { way: 0 });
    // Same line, different byte.
    assert!(cache.access(PhysAddr::new(0x1235), AccessType::Load).unwrap().is_hit());
    assert_eq!(cache.stats().hits(), 2);
    assert_eq!(cache.stats().misses(), 1);
}

/// 0x1000 and 0x1100 share set 0 of a 64-line direct-mapped cache.
#[test]
fn direct_mapped_aliasing_thrashes() {
    let mut cache = tiny_cache(Associativity::DirectMapped, None);
    for _ in 0..4 {
        for addr in [0x1000, 0x1100] {
            let outcome = cache.access(PhysAddr::new(addr), AccessType::Load).unwrap();
            assert_eq!(outcome, Lookup::Miss { way: Some(0) });
        }
    }
    let (hits, misses) = load_counters(&cache);
    assert_eq!(misses[0], 8);
    assert_eq!(hits[0], 0);
    assert_eq!(misses[1..].iter().sum::<u64>(), 0);
}

#[test]
fn two_way_holds_both_aliases() {
    let mut cache = tiny_cache(Associativity::TwoWay, Some(ReplacementPolicy::Lru));
    let a = addr_for(&cache, 0x10, 0);
    let b = addr_for(&cache, 0x11, 0);
    for addr in [a, b, a, b, a] {
        let _ = cache.access(addr, AccessType::Load).unwrap();
    }
    assert_eq!(cache.stats().misses(), 2);
    assert_eq!(cache.stats().hits(), 3);
    assert_eq!(set_tags(&cache, 0), vec![Some(0x10), Some(0x11)]);
}

#[test]
fn counters_are_per_set() {
    let mut cache = tiny_cache(Associativity::FourWay, Some(ReplacementPolicy::Lfu));
    let sets = cache.geometry().lines_per_way();
    assert_eq!(sets, 16);

    for set in [0, 3, 3, 15] {
        let addr = addr_for(&cache, 1, set);
        let _ = cache.access(addr, AccessType::Load).unwrap();
    }
    let (hits, misses) = load_counters(&cache);
    assert_eq!(hits.len(), 16);
    assert_eq!(misses[0], 1);
    assert_eq!(misses[3], 1);
    assert_eq!(hits[3], 1);
    assert_eq!(misses[15], 1);
    assert_eq!(misses.iter().sum::<u64>(), 3);
}

#[test]
fn data_cache_splits_loads_and_stores() {
    let mut cache = tiny_cache(Associativity::DirectMapped, None);
    let addr = PhysAddr::new(0x40);
    let _ = cache.access(addr, AccessType::Store).unwrap();
    let _ = cache.access(addr, AccessType::Load).unwrap();
    let _ = cache.access(addr, AccessType::Store).unwrap();

    let CacheStats::Split { load, store } = cache.stats() else {
        panic!("data cache should split counters");
    };
    assert_eq!((load.total_hits(), load.total_misses()), (1, 0));
    assert_eq!((store.total_hits(), store.total_misses()), (1, 1));
}

#[test]
fn instruction_cache_uses_unified_counters() {
    let cfg = "4x256_2w_lru".parse().unwrap();
    let mut cache = Cache::new(CacheRole::Instruction, &cfg, TEST_SEED).unwrap();
    let _ = cache.access(PhysAddr::new(0x8000_0000), AccessType::Fetch).unwrap();
    assert!(matches!(cache.stats(), CacheStats::Unified(c) if c.total_misses() == 1));
}

#[test]
fn reset_stats_keeps_lines() {
    let mut cache = tiny_cache(Associativity::DirectMapped, None);
    let addr = PhysAddr::new(0x200);
    let _ = cache.access(addr, AccessType::Load).unwrap();
    cache.reset_stats();
    assert_eq!(cache.stats().misses(), 0);
    assert!(cache.contains(addr));
    assert!(cache.access(addr, AccessType::Load).unwrap().is_hit());
}

#[test]
fn invalidate_then_access_misses() {
    let mut cache = tiny_cache(Associativity::TwoWay, Some(ReplacementPolicy::Lru));
    let addr = addr_for(&cache, 0x3, 5);
    let _ = cache.access(addr, AccessType::Load).unwrap();
    assert!(cache.contains(addr));

    assert!(cache.invalidate_index(addr));
    assert!(!cache.contains(addr));
    assert!(!cache.invalidate_index(addr));
    assert!(!cache.access(addr, AccessType::Load).unwrap().is_hit());
}

#[test]
fn invalidate_index_uses_way_bits() {
    let mut cache = tiny_cache(Associativity::TwoWay, Some(ReplacementPolicy::Lru));
    let a = addr_for(&cache, 0x1, 2);
    let b = addr_for(&cache, 0x2, 2);
    let _ = cache.access(a, AccessType::Load).unwrap();
    let _ = cache.access(b, AccessType::Load).unwrap();

    // Set the top index bit: selects way 1 of set 2, which holds b.
    let g = cache.geometry();
    let way1 = PhysAddr::new(a.val() | ((g.way_mask()[1] as u64) << g.offset_width()));
    assert!(cache.invalidate_index(way1));
    assert_eq!(set_tags(&cache, 2), vec![Some(0x1), None]);
}

#[test]
fn invalidate_line_out_of_range_is_ignored() {
    let mut cache = tiny_cache(Associativity::DirectMapped, None);
    let addr = addr_for(&cache, 0x4, 0);
    let _ = cache.access(addr, AccessType::Load).unwrap();
    let count = cache.geometry().line_count();

    assert!(!cache.invalidate_line(count));
    assert!(!cache.invalidate_line(usize::MAX));
    assert!(cache.line(count).is_none());
    assert!(cache.contains(addr));
    assert!(cache.invalidate_line(0));
    assert!(!cache.contains(addr));
}

#[test]
fn hit_invalidate_reports_presence() {
    let mut cache = tiny_cache(Associativity::FourWay, Some(ReplacementPolicy::Random));
    let addr = addr_for(&cache, 0x9, 1);
    assert!(!cache.hit_invalidate(addr).unwrap());
    let _ = cache.access(addr, AccessType::Load).unwrap();
    assert!(cache.hit_invalidate(addr).unwrap());
    assert!(!cache.contains(addr));
}

#[test]
fn fill_does_not_count() {
    let mut cache = tiny_cache(Associativity::TwoWay, Some(ReplacementPolicy::Lfu));
    let addr = addr_for(&cache, 0x7, 0);
    assert_eq!(cache.fill(addr).unwrap(), Fill::Filled { way: 0 });
    assert_eq!(cache.stats().hits() + cache.stats().misses(), 0);
    assert!(cache.access(addr, AccessType::Load).unwrap().is_hit());
}

#[test]
fn fetch_lock_pins_line_against_eviction() {
    let mut cache = tiny_cache(Associativity::TwoWay, Some(ReplacementPolicy::Lru));
    let pinned = addr_for(&cache, 0x1, 0);
    assert_eq!(cache.fetch_lock(pinned).unwrap(), Fill::Filled { way: 0 });

    for tag in 2..10 {
        let _ = cache.access(addr_for(&cache, tag, 0), AccessType::Load).unwrap();
    }
    assert!(cache.contains(pinned));
    let line = cache.line(cache.geometry().line_of(0, 0)).unwrap();
    assert!(line.valid && line.locked);
    assert_eq!(line.tag, 0x1);
}

#[test]
fn line_out_of_range_is_none() {
    let cache = tiny_cache(Associativity::DirectMapped, None);
    assert!(cache.line(63).is_some());
    assert!(cache.line(64).is_none());
}

#[test]
fn strict_construction_rejects_small_cache() {
    let cfg = "1x64_dm".parse().unwrap();
    let err = Cache::new(CacheRole::Data, &cfg, TEST_SEED).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedSize { .. }));
}

#[test]
fn larger_lines_share_a_block() {
    let mut cache = data_cache(8, 64, Associativity::DirectMapped, None);
    assert_eq!(cache.geometry().offset_width(), 5);
    let _ = cache.access(PhysAddr::new(0x100), AccessType::Load).unwrap();
    assert!(cache.access(PhysAddr::new(0x11C), AccessType::Load).unwrap().is_hit());
    assert!(!cache.access(PhysAddr::new(0x120), AccessType::Load).unwrap().is_hit());
}
