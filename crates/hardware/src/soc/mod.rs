//! System-on-chip components of the memory subsystem.
//!
//! This module organizes everything outside the cache engines themselves:
//! 1. **Ports:** Valid/ready wire bundles for the burst and lite memory ports.
//! 2. **Memory:** Cycle-stepped backing-store models (burst and lite RAM).
//! 3. **Arbiter:** Serialization of instruction and data traffic onto the
//!    shared external ports.
//! 4. **Subsystem:** The top-level composition behind the CPU-facing surface.

/// External-request arbiter.
pub mod arbiter;

/// Backing-store models.
pub mod memory;

/// Wire bundles for the memory-facing ports.
pub mod port;

/// Top-level memory subsystem.
pub mod subsystem;

pub use arbiter::RequestArbiter;
pub use subsystem::MemorySubsystem;
