//! Configuration and setup error types.
//!
//! Simulation-time behavior never produces error values: by contract, a
//! request that cannot complete simply keeps the stall output asserted.
//! Errors exist only at the setup boundary, where a configuration can be
//! rejected before any cycle is simulated.

use thiserror::Error;

/// Errors raised while building or reconfiguring the memory subsystem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemError {
    /// The cache configuration cannot be mapped onto a set/way/line geometry.
    #[error("invalid cache geometry: {reason}")]
    Geometry {
        /// Human-readable description of the constraint that failed.
        reason: String,
    },

    /// A non-cacheable range with `base > limit` was requested.
    #[error("non-cacheable range base {base:#010x} exceeds limit {limit:#010x}")]
    Range {
        /// Requested range base (inclusive).
        base: u32,
        /// Requested range limit (exclusive).
        limit: u32,
    },

    /// A memory image does not fit in the backing store.
    #[error("image of {len} bytes at offset {offset:#x} exceeds memory size {size}")]
    ImageOverflow {
        /// Image length in bytes.
        len: usize,
        /// Load offset in bytes.
        offset: usize,
        /// Backing store size in bytes.
        size: usize,
    },
}
