//! Backing-store models for the external memory ports.
//!
//! This module implements the byte-addressable RAMs the memory subsystem
//! talks to. It provides:
//! 1. **Burst RAM:** Accepts full-line burst reads and writes, streaming one
//!    beat per cycle.
//! 2. **Lite RAM:** Single-beat reads and strobe-masked writes for the
//!    non-cacheable path.
//!
//! Both models are cycle-stepped slaves of their port and additionally expose
//! direct accessors (`read_u32`, `write_u32`, `load`) used for image loading
//! and golden-reference comparison; the direct accessors never interact with
//! the port state machine.

/// Burst-capable RAM model.
pub mod burst;

/// Single-beat (lite) RAM model.
pub mod lite;

pub use burst::BurstRam;
pub use lite::LiteRam;
