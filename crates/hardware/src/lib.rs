//! Configurable hardware cache simulator library.
//!
//! This crate models CPU caches as fixed arrays of tagged lines and classifies
//! simulated memory accesses as hits or misses:
//! 1. **Common:** Physical addresses, access types, configuration errors and fatal faults.
//! 2. **Config:** Cache geometry and hierarchy configuration (JSON or geometry strings).
//! 3. **Cache:** Validated geometry, line store and the replacement policies
//!    (direct-mapped, LRU, LFU, random).
//! 4. **Hierarchy:** L1 instruction/data caches cascading misses into a unified L2.
//! 5. **Stats:** Per-set hit/miss counters and summaries.
//!
//! Only occupancy is modelled: no data bytes, dirty state, coherency or timing.

/// Common types (addresses, access types, errors).
pub mod common;
/// Cache configuration (geometry, levels, policies, hierarchy).
pub mod config;
/// Cache geometry, line store and replacement policies.
pub mod cache;
/// Multi-level access coordination and cache-control operations.
pub mod hierarchy;
/// Per-set statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `CacheHierarchyConfig::default()` or deserialize from JSON.
pub use crate::config::CacheHierarchyConfig;
/// A single simulated cache.
pub use crate::cache::Cache;
/// The complete hierarchy; construct with `CacheHierarchy::new`.
pub use crate::hierarchy::CacheHierarchy;
