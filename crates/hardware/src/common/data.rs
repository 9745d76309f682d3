//! Memory Access Types.
//!
//! The emulator classifies every access before handing it to the hierarchy.
//! The classification selects the L1 cache (instruction or data) and, for the
//! data cache, which of the load/store counter pairs is updated.

use serde::{Deserialize, Serialize};

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Instruction fetch; served by the instruction cache.
    Fetch,
    /// Data load; served by the data cache.
    Load,
    /// Data store; served by the data cache.
    Store,
}

impl AccessType {
    /// Returns `true` for accesses routed to the data cache.
    #[inline]
    pub const fn is_data(self) -> bool {
        matches!(self, Self::Load | Self::Store)
    }
}
