//! Validated cache geometry and address decoding.
//!
//! A geometry is derived once from a [`CacheConfig`] and is immutable afterwards.
//! Lines of a set are not stored contiguously: way `w` of base set `s` lives at
//! line `s | way_mask[w]`, where each mask sets the top index bits to `w`. A 2-way
//! cache therefore splits the line store into two halves, a 4-way cache into four
//! quarters.
//!
//! Decoding uses the *set* index width (total index width minus way width) for
//! the index, and the *total* index width for the tag shift.

use crate::common::addr::{decode_index, decode_tag, low_mask};
use crate::common::{ConfigError, Decoded, PhysAddr};
use crate::config::{CacheConfig, CacheLevel, ReplacementPolicy};

/// Word counts accepted for a line.
const SUPPORTED_WORDS: [u32; 4] = [1, 2, 4, 8];

/// Validated, immutable description of one cache's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeometry {
    level: CacheLevel,
    words_per_line: u32,
    line_count: usize,
    offset_width: u32,
    index_width: u32,
    way_width: u32,
    ways: usize,
    lines_per_way: usize,
    way_mask: Vec<usize>,
    policy: Option<ReplacementPolicy>,
}

impl CacheGeometry {
    /// Builds a geometry, enforcing the line-count and capacity ranges of `level`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the line size is unsupported, the line count
    /// is not a power of two inside the level's range, the capacity is outside the
    /// level's range, or an associative cache has no replacement policy.
    pub fn new(config: &CacheConfig, level: CacheLevel) -> Result<Self, ConfigError> {
        Self::build(config, level, true)
    }

    /// Builds a geometry without the per-level size ranges.
    ///
    /// Structural rules still apply: supported line size, a power-of-two line
    /// count of at least one line per way, and a policy for associative caches.
    /// Useful for small experimental caches below the hardware range.
    ///
    /// # Errors
    ///
    /// See [`CacheGeometry::new`], minus the range checks.
    pub fn relaxed(config: &CacheConfig, level: CacheLevel) -> Result<Self, ConfigError> {
        Self::build(config, level, false)
    }

    fn build(config: &CacheConfig, level: CacheLevel, strict: bool) -> Result<Self, ConfigError> {
        if !SUPPORTED_WORDS.contains(&config.words_per_line) {
            return Err(ConfigError::UnsupportedLineSize {
                words: config.words_per_line,
            });
        }

        let ways = config.associativity.ways();
        let (min, max) = if strict {
            level.line_range()
        } else {
            (ways as u32, u32::MAX)
        };
        if !config.lines.is_power_of_two() || config.lines < min || config.lines > max {
            return Err(ConfigError::UnsupportedLineCount {
                level,
                lines: config.lines,
                min,
                max,
            });
        }

        if strict {
            let (min, max) = level.byte_range();
            let bytes = config.size_bytes();
            if bytes < min || bytes > max {
                return Err(ConfigError::UnsupportedSize {
                    level,
                    bytes,
                    min,
                    max,
                });
            }
        }

        let policy = if ways == 1 {
            None
        } else {
            Some(config.policy.ok_or(ConfigError::MissingPolicy { ways })?)
        };

        let line_count = config.lines as usize;
        let offset_width = config.words_per_line.trailing_zeros() + 2;
        let index_width = config.lines.trailing_zeros();
        let way_width = config.associativity.way_width();
        let set_width = index_width - way_width;
        let way_mask = (0..ways).map(|w| w << set_width).collect();

        Ok(Self {
            level,
            words_per_line: config.words_per_line,
            line_count,
            offset_width,
            index_width,
            way_width,
            ways,
            lines_per_way: line_count / ways,
            way_mask,
            policy,
        })
    }

    /// Splits `addr` into tag and base set index.
    #[inline]
    pub fn decode(&self, addr: PhysAddr) -> Decoded {
        let set_mask = low_mask(self.index_width - self.way_width);
        Decoded {
            tag: decode_tag(addr.val(), self.offset_width + self.index_width),
            set: decode_index(addr.val(), set_mask, self.offset_width) as usize,
        }
    }

    /// Physical line named by the full index field of `addr`, way bits included.
    ///
    /// Index-addressed cache operations use this to select one line directly.
    #[inline]
    pub fn line_index(&self, addr: PhysAddr) -> usize {
        decode_index(addr.val(), low_mask(self.index_width), self.offset_width) as usize
    }

    /// Physical line holding way `way` of base set `set`.
    #[inline]
    pub fn line_of(&self, set: usize, way: usize) -> usize {
        set | self.way_mask[way]
    }

    /// Candidate lines of base set `set`.
    #[inline]
    pub fn set(&self, set: usize) -> SetRef<'_> {
        SetRef {
            base: set,
            way_mask: &self.way_mask,
        }
    }

    /// Level whose limits this geometry was checked against.
    pub const fn level(&self) -> CacheLevel {
        self.level
    }

    /// 32-bit words per line.
    pub const fn words_per_line(&self) -> u32 {
        self.words_per_line
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> u64 {
        self.words_per_line as u64 * 4
    }

    /// Total number of lines.
    pub const fn line_count(&self) -> usize {
        self.line_count
    }

    /// Width of the byte offset field.
    pub const fn offset_width(&self) -> u32 {
        self.offset_width
    }

    /// Width of the full index field, way bits included.
    pub const fn index_width(&self) -> u32 {
        self.index_width
    }

    /// `log2` of the associativity.
    pub const fn way_width(&self) -> u32 {
        self.way_width
    }

    /// Number of ways per set.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Number of sets; also the length of the per-set counter arrays.
    pub const fn lines_per_way(&self) -> usize {
        self.lines_per_way
    }

    /// Index bit patterns that select each way from a base set index.
    pub fn way_mask(&self) -> &[usize] {
        &self.way_mask
    }

    /// Replacement policy; `None` for direct-mapped caches.
    pub const fn policy(&self) -> Option<ReplacementPolicy> {
        self.policy
    }
}

/// One set of an associative cache: a base index plus the way masks.
#[derive(Debug, Clone, Copy)]
pub struct SetRef<'a> {
    /// Base set index (way bits clear).
    pub base: usize,
    /// Way mask table of the owning cache.
    pub way_mask: &'a [usize],
}

impl SetRef<'_> {
    /// Number of candidate ways.
    #[inline]
    pub const fn ways(&self) -> usize {
        self.way_mask.len()
    }

    /// Physical line index of `way`.
    #[inline]
    pub fn line(&self, way: usize) -> usize {
        self.base | self.way_mask[way]
    }
}
