//! Common types shared by every part of the cache model.
//!
//! 1. **Addresses:** The `PhysAddr` type and bit-field extraction helpers.
//! 2. **Access Types:** Fetch/load/store classification of an access.
//! 3. **Errors:** Configuration errors and fatal cache faults.

/// Physical addresses and field extraction.
pub mod addr;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{Decoded, PhysAddr};
pub use data::AccessType;
pub use error::{CacheFault, ConfigError};
