//! Cycle-accurate cache and memory-subsystem simulator.
//!
//! This crate implements the memory side of an RV32 SoC as a cycle-stepped
//! functional model:
//! 1. **Caches:** A write-back set-associative data cache and a read-only
//!    instruction cache, both with full-line burst fills, LRU replacement,
//!    and a non-cacheable bypass range.
//! 2. **Bypass:** A single-beat lite path, embedded in both caches and
//!    standalone for fully non-cacheable regions.
//! 3. **Arbitration:** A fixed-priority, transaction-atomic arbiter funneling
//!    both engines onto one external port pair.
//! 4. **Memory:** Burst and lite backing-RAM models.
//! 5. **Composition:** A top-level subsystem stepped one clock cycle at a
//!    time behind a CPU-facing request/response surface.

/// Common types (addresses, constants, errors).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Cache engines (line storage, data cache, instruction cache, bypass).
pub mod core;
/// SoC composition (ports, backing RAM, arbiter, subsystem).
pub mod soc;
/// Statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Setup-time error type.
pub use crate::common::MemError;
/// Top-level memory subsystem; construct with `MemorySubsystem::new`.
pub use crate::soc::MemorySubsystem;
