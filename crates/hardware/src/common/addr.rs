//! Physical addresses and their decomposition into cache fields.
//!
//! The cache model never sees virtual addresses; translation happens in the
//! emulator before an access reaches the hierarchy. This module provides:
//! 1. **Type Safety:** A strong `PhysAddr` type so raw integers are not confused with tags.
//! 2. **Field Extraction:** Offset, set-index and tag extraction given the bit widths of a cache.
//!
//! Byte addressing is assumed throughout: a line of `w` 32-bit words has an
//! offset field of `log2(w) + 2` bits.

use std::fmt;

/// A physical address as presented to the cache hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }
}

impl From<u64> for PhysAddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Result of splitting an address against one cache geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// High-order bits identifying the memory block.
    pub tag: u64,
    /// Base set index (way bits excluded).
    pub set: usize,
}

/// Extracts `(addr >> offset) & mask`.
///
/// # Arguments
///
/// * `addr` - The address to decode.
/// * `mask` - Mask applied after the shift; `2^width - 1` for a field of `width` bits.
/// * `offset` - Number of low-order bits to discard.
#[inline(always)]
pub const fn decode_index(addr: u64, mask: u64, offset: u32) -> u64 {
    (addr >> offset) & mask
}

/// Extracts the tag: every bit above `width`.
///
/// Widths of 64 or more yield a tag of zero instead of overflowing the shift.
#[inline(always)]
pub const fn decode_tag(addr: u64, width: u32) -> u64 {
    if width >= u64::BITS {
        0
    } else {
        addr >> width
    }
}

/// Builds a mask with the low `width` bits set.
#[inline(always)]
pub const fn low_mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}
