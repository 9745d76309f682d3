//! Error taxonomy for the cache model.
//!
//! Two families of failure exist:
//! 1. **Configuration errors:** Rejected geometry or an inconsistent hierarchy. The
//!    cache is never created and no state is touched.
//! 2. **Cache faults:** Internal-consistency violations detected while a policy scans
//!    a set. These are fatal; the operation stops at the point of detection and the
//!    fault is handed back unmodified.
//!
//! A set whose every way is valid and locked is *not* an error. It is reported
//! through `tracing` and the access still resolves as a miss.

use thiserror::Error;

use crate::config::CacheLevel;

/// Reasons a cache or hierarchy configuration is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Line size is not one of the supported word counts.
    #[error("unsupported line size: {words} words per line (expected 1, 2, 4 or 8)")]
    UnsupportedLineSize {
        /// Requested words per line.
        words: u32,
    },

    /// Line count is not a power of two inside the level's range.
    #[error("unsupported line count for {level}: {lines} (expected a power of two in {min}..={max})")]
    UnsupportedLineCount {
        /// Cache level being configured.
        level: CacheLevel,
        /// Requested line count.
        lines: u32,
        /// Smallest accepted line count.
        min: u32,
        /// Largest accepted line count.
        max: u32,
    },

    /// Total capacity falls outside the level's range.
    #[error("unsupported size for {level}: {bytes} bytes (expected {min}..={max})")]
    UnsupportedSize {
        /// Cache level being configured.
        level: CacheLevel,
        /// Resulting capacity in bytes.
        bytes: u64,
        /// Smallest accepted capacity.
        min: u64,
        /// Largest accepted capacity.
        max: u64,
    },

    /// An associative cache was configured without a replacement policy.
    #[error("a {ways}-way cache needs a replacement policy (lru, lfu or rnd)")]
    MissingPolicy {
        /// Associativity of the offending cache.
        ways: usize,
    },

    /// The L2 line is narrower than an enabled L1 line.
    #[error("L2 line size ({l2_words} words) is smaller than the {l1} line size ({l1_words} words)")]
    L2LineTooSmall {
        /// Which L1 cache conflicts.
        l1: &'static str,
        /// L1 words per line.
        l1_words: u32,
        /// L2 words per line.
        l2_words: u32,
    },

    /// L2 lookups were requested but no L2 cache is configured.
    #[error("L2 is enabled but no L2 cache is configured")]
    MissingL2,

    /// A geometry string could not be parsed.
    #[error("invalid cache geometry '{0}' (expected <words>x<lines>_<dm|2w|4w>[_<lru|lfu|rnd>])")]
    InvalidGeometry(String),

    /// The JSON configuration could not be decoded.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal internal-consistency violations raised by replacement policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CacheFault {
    /// A line was found locked while not valid.
    #[error("line {line:#x} in way {way} is invalid and locked")]
    InvalidLocked {
        /// Physical line index in the line store.
        line: usize,
        /// Way the line belongs to.
        way: usize,
    },
}
