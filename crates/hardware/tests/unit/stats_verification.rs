//! Statistics unit tests.
//!
//! Verifies per-set counter layout, totals, miss-rate computation and the
//! rendered and serialized summaries.

use cachesim_core::cache::CacheRole;
use cachesim_core::common::AccessType;
use cachesim_core::stats::{CacheStats, CacheSummary, HierarchyStats, SetCounters, SplitSummary};
use pretty_assertions::assert_eq;

#[test]
fn set_counters_start_zeroed() {
    let counters = SetCounters::new(8);
    assert_eq!(counters.hits, vec![0; 8]);
    assert_eq!(counters.misses, vec![0; 8]);
    assert_eq!(counters.total_hits(), 0);
}

#[test]
fn set_counters_record_per_set() {
    let mut counters = SetCounters::new(4);
    counters.record(1, true);
    counters.record(1, false);
    counters.record(3, false);
    counters.record(3, false);
    assert_eq!(counters.hits, vec![0, 1, 0, 0]);
    assert_eq!(counters.misses, vec![0, 1, 0, 2]);
    assert_eq!(counters.total_misses(), 3);

    counters.reset();
    assert_eq!(counters, SetCounters::new(4));
}

#[test]
fn layout_follows_role() {
    assert!(matches!(CacheStats::for_role(CacheRole::Data, 4), CacheStats::Split { .. }));
    assert!(matches!(CacheStats::for_role(CacheRole::Instruction, 4), CacheStats::Unified(_)));
    assert!(matches!(CacheStats::for_role(CacheRole::Secondary, 4), CacheStats::Unified(_)));
}

#[test]
fn unified_counts_every_kind_together() {
    let mut stats = CacheStats::for_role(CacheRole::Secondary, 2);
    stats.record(0, AccessType::Fetch, false);
    stats.record(0, AccessType::Load, true);
    stats.record(1, AccessType::Store, true);
    assert_eq!((stats.hits(), stats.misses()), (2, 1));

    let summary = stats.summary(CacheRole::Secondary);
    assert_eq!(summary.name, "L2");
    assert_eq!(summary.split, None);
}

#[test]
fn split_summary_separates_loads_and_stores() {
    let mut stats = CacheStats::for_role(CacheRole::Data, 2);
    stats.record(0, AccessType::Load, true);
    stats.record(0, AccessType::Load, false);
    stats.record(1, AccessType::Store, false);

    let summary = stats.summary(CacheRole::Data);
    assert_eq!(
        summary,
        CacheSummary {
            name: "L1-D",
            hits: 1,
            misses: 2,
            split: Some(SplitSummary {
                load_hits: 1,
                load_misses: 1,
                store_hits: 0,
                store_misses: 1,
            }),
        }
    );

    stats.reset();
    assert_eq!(stats.hits() + stats.misses(), 0);
}

#[test]
fn miss_rate_in_percent() {
    let summary = CacheSummary {
        name: "L1-I",
        hits: 75,
        misses: 25,
        split: None,
    };
    assert_eq!(summary.accesses(), 100);
    assert!((summary.miss_rate() - 25.0).abs() < 1e-10);

    let idle = CacheSummary { hits: 0, misses: 0, ..summary };
    assert!(idle.miss_rate().abs() < f64::EPSILON);
}

#[test]
fn display_lists_configured_caches() {
    let stats = HierarchyStats {
        icache: Some(CacheSummary {
            name: "L1-I",
            hits: 3,
            misses: 1,
            split: None,
        }),
        dcache: Some(CacheSummary {
            name: "L1-D",
            hits: 0,
            misses: 2,
            split: Some(SplitSummary {
                load_hits: 0,
                load_misses: 1,
                store_hits: 0,
                store_misses: 1,
            }),
        }),
        l2: None,
    };
    let text = stats.to_string();
    assert!(text.contains("CACHE SIMULATION STATISTICS"));
    assert!(text.contains("L1-I"));
    assert!(text.contains("miss_rate: 25.00%"));
    assert!(text.contains("loads  hit/miss: 0 / 1"));
    assert!(text.contains("stores hit/miss: 0 / 1"));
    assert!(!text.contains("L2"));
}

#[test]
fn summary_serializes_without_empty_split() {
    let summary = CacheSummary {
        name: "L2",
        hits: 5,
        misses: 5,
        split: None,
    };
    let json = serde_json::to_value(summary).unwrap();
    assert_eq!(json["name"], "L2");
    assert_eq!(json["hits"], 5);
    assert!(json.get("split").is_none());
}
