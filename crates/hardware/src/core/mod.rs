//! Cache engines of the memory subsystem.
//!
//! This module contains the CPU-side machinery: line storage, the LRU
//! replacement tracker, the write-back data cache engine, the read-only
//! instruction cache engine, and the single-beat bypass path shared by both.

/// Cache line storage, replacement tracking, and the cache engines.
pub mod cache;

pub use cache::data::DataCache;
pub use cache::instr::InstrCache;
