//! Configuration system for the cache simulator.
//!
//! This module defines the structures used to describe a cache hierarchy. It provides:
//! 1. **Defaults:** Baseline geometry used when a field is omitted.
//! 2. **Structures:** Per-cache geometry (`CacheConfig`) and the hierarchy around it.
//! 3. **Enums:** Cache level, associativity class and replacement policy.
//! 4. **Geometry strings:** The compact `<words>x<lines>_<assoc>[_<policy>]` form
//!    accepted on the command line, e.g. `4x256_2w_lru`.
//!
//! Configuration is plain data; limits are enforced when a
//! [`CacheGeometry`](crate::cache::CacheGeometry) is built from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;

/// Default configuration constants.
mod defaults {
    /// Default words per line (16-byte lines).
    pub const WORDS_PER_LINE: u32 = 4;

    /// Default L1 line count (8 KiB with 16-byte lines).
    pub const L1_LINES: u32 = 512;

    /// Default seed for the random replacement policy.
    pub const SEED: u64 = 0x6764_7031;
}

/// Level of a cache in the hierarchy; selects the accepted size ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheLevel {
    /// First-level instruction or data cache.
    L1,
    /// Unified second-level cache.
    L2,
}

impl CacheLevel {
    /// Accepted line counts (inclusive, powers of two).
    pub const fn line_range(self) -> (u32, u32) {
        match self {
            Self::L1 => (64, 8192),
            Self::L2 => (2048, 262_144),
        }
    }

    /// Accepted capacity in bytes (inclusive).
    pub const fn byte_range(self) -> (u64, u64) {
        match self {
            Self::L1 => (2 * 1024, 32 * 1024),
            Self::L2 => (256 * 1024, 4 * 1024 * 1024),
        }
    }
}

impl fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L1 => f.write_str("L1"),
            Self::L2 => f.write_str("L2"),
        }
    }
}

/// Associativity class of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Associativity {
    /// One way per set.
    #[default]
    #[serde(rename = "dm", alias = "DirectMapped", alias = "direct-mapped", alias = "direct")]
    DirectMapped,
    /// Two ways per set.
    #[serde(rename = "2w", alias = "TwoWay", alias = "2-way")]
    TwoWay,
    /// Four ways per set.
    #[serde(rename = "4w", alias = "FourWay", alias = "4-way")]
    FourWay,
}

impl Associativity {
    /// `log2` of the number of ways.
    pub const fn way_width(self) -> u32 {
        match self {
            Self::DirectMapped => 0,
            Self::TwoWay => 1,
            Self::FourWay => 2,
        }
    }

    /// Number of ways per set.
    pub const fn ways(self) -> usize {
        1 << self.way_width()
    }
}

impl FromStr for Associativity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dm" | "direct" | "direct-mapped" => Ok(Self::DirectMapped),
            "2w" | "2-way" => Ok(Self::TwoWay),
            "4w" | "4-way" => Ok(Self::FourWay),
            _ => Err(ConfigError::InvalidGeometry(s.to_string())),
        }
    }
}

/// Cache replacement policy algorithms for associative caches.
///
/// Direct-mapped caches have a single candidate line and ignore this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementPolicy {
    /// Least Recently Used: evicts the line with the lowest recency rank.
    #[serde(alias = "Lru", alias = "LRU")]
    Lru,
    /// Least Frequently Used: evicts the line with the lowest access count.
    #[serde(alias = "Lfu", alias = "LFU")]
    Lfu,
    /// Uniform random selection among unlocked lines.
    #[serde(alias = "rnd", alias = "Random")]
    Random,
}

impl FromStr for ReplacementPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            "rnd" | "random" => Ok(Self::Random),
            _ => Err(ConfigError::InvalidGeometry(s.to_string())),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lru => f.write_str("lru"),
            Self::Lfu => f.write_str("lfu"),
            Self::Random => f.write_str("rnd"),
        }
    }
}

/// Geometry of a single cache, as supplied by the user.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::{Associativity, CacheConfig, ReplacementPolicy};
///
/// let cfg: CacheConfig = "4x256_2w_lru".parse().unwrap();
/// assert_eq!(cfg.words_per_line, 4);
/// assert_eq!(cfg.lines, 256);
/// assert_eq!(cfg.associativity, Associativity::TwoWay);
/// assert_eq!(cfg.policy, Some(ReplacementPolicy::Lru));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 32-bit words per cache line.
    #[serde(default = "CacheConfig::default_words_per_line")]
    pub words_per_line: u32,

    /// Total number of lines across all ways.
    #[serde(default = "CacheConfig::default_lines")]
    pub lines: u32,

    /// Associativity class.
    #[serde(default)]
    pub associativity: Associativity,

    /// Replacement policy; required unless direct-mapped.
    #[serde(default)]
    pub policy: Option<ReplacementPolicy>,
}

impl CacheConfig {
    /// Returns the default words per line.
    const fn default_words_per_line() -> u32 {
        defaults::WORDS_PER_LINE
    }

    /// Returns the default line count.
    const fn default_lines() -> u32 {
        defaults::L1_LINES
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> u64 {
        self.words_per_line as u64 * 4
    }

    /// Total capacity in bytes.
    pub const fn size_bytes(&self) -> u64 {
        self.line_bytes() * self.lines as u64
    }
}

impl Default for CacheConfig {
    /// An 8 KiB direct-mapped cache with 16-byte lines.
    fn default() -> Self {
        Self {
            words_per_line: defaults::WORDS_PER_LINE,
            lines: defaults::L1_LINES,
            associativity: Associativity::DirectMapped,
            policy: None,
        }
    }
}

impl FromStr for CacheConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidGeometry(s.to_string());
        let mut parts = s.trim().split('_');

        let (words, lines) = parts
            .next()
            .and_then(|dims| dims.split_once(['x', 'X']))
            .ok_or_else(invalid)?;
        let words_per_line = words.parse().map_err(|_| invalid())?;
        let lines = lines.parse().map_err(|_| invalid())?;

        let associativity = parts
            .next()
            .ok_or_else(invalid)?
            .parse::<Associativity>()
            .map_err(|_| invalid())?;

        let policy = parts
            .next()
            .map(|p| p.parse::<ReplacementPolicy>().map_err(|_| invalid()))
            .transpose()?;

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            words_per_line,
            lines,
            associativity,
            policy,
        })
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assoc = match self.associativity {
            Associativity::DirectMapped => "dm",
            Associativity::TwoWay => "2w",
            Associativity::FourWay => "4w",
        };
        write!(f, "{}x{}_{}", self.words_per_line, self.lines, assoc)?;
        if let Some(policy) = self.policy {
            write!(f, "_{policy}")?;
        }
        Ok(())
    }
}

/// Cache hierarchy configuration.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::CacheHierarchyConfig;
///
/// let json = r#"{
///     "l1_i": { "words_per_line": 4, "lines": 256, "associativity": "2w", "policy": "lru" },
///     "l1_d": { "words_per_line": 2, "lines": 1024 },
///     "l2":   { "words_per_line": 8, "lines": 4096, "associativity": "4w", "policy": "rnd" },
///     "l2_enabled": true
/// }"#;
///
/// let config = CacheHierarchyConfig::from_json(json).unwrap();
/// assert!(config.l2_enabled);
/// assert_eq!(config.l1_d.unwrap().lines, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache, if present.
    #[serde(default)]
    pub l1_i: Option<CacheConfig>,

    /// L1 data cache, if present.
    #[serde(default)]
    pub l1_d: Option<CacheConfig>,

    /// Unified L2 cache, if present.
    #[serde(default)]
    pub l2: Option<CacheConfig>,

    /// Consult L2 on an L1 miss.
    #[serde(default)]
    pub l2_enabled: bool,

    /// Seed for random replacement.
    #[serde(default = "CacheHierarchyConfig::default_seed")]
    pub seed: u64,

    /// Enforce the per-level line-count and capacity ranges.
    #[serde(default = "CacheHierarchyConfig::default_strict_limits")]
    pub strict_limits: bool,
}

impl CacheHierarchyConfig {
    /// Returns the default random-replacement seed.
    const fn default_seed() -> u64 {
        defaults::SEED
    }

    /// Size ranges are enforced unless explicitly relaxed.
    const fn default_strict_limits() -> bool {
        true
    }

    /// Decodes a hierarchy configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when the text is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for CacheHierarchyConfig {
    /// Default I- and D-caches, no L2.
    fn default() -> Self {
        Self {
            l1_i: Some(CacheConfig::default()),
            l1_d: Some(CacheConfig::default()),
            l2: None,
            l2_enabled: false,
            seed: defaults::SEED,
            strict_limits: true,
        }
    }
}
