//! Cache line storage and the CPU-facing request types.
//!
//! This module implements the storage half of the caches. It provides:
//! 1. **Request/Response:** The CPU-facing data-path surface (address,
//!    read/write enables, write data, byte-enable mask; stall and read data).
//! 2. **Line Storage:** The set-associative array of tagged lines with valid
//!    and dirty bits, owned exclusively by its engine.
//! 3. **Replacement:** Per-set LRU recency tracking.
//!
//! The engines that drive this storage live in [`data`], [`instr`] and
//! [`bypass`].

/// Single-beat bypass path and the standalone no-cache engine.
pub mod bypass;

/// Write-back set-associative data cache engine.
pub mod data;

/// Read-only instruction cache engine.
pub mod instr;

/// Least-recently-used replacement tracking.
pub mod lru;

use crate::common::addr::{AddrParts, Geometry};
use crate::common::constants::WORD_BYTES;

use self::lru::LruTracker;

/// One CPU data-path request, sampled every cycle.
///
/// `read_enable` and `write_enable` are mutually exclusive; a cycle with
/// neither asserted is an idle cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuRequest {
    /// Word-aligned byte address.
    pub addr: u32,
    /// Request is a read.
    pub read_enable: bool,
    /// Request is a write.
    pub write_enable: bool,
    /// Write data (ignored for reads).
    pub write_data: u32,
    /// Byte-enable mask: bit `i` selects byte `i` of the word.
    pub byte_enable: u8,
}

impl CpuRequest {
    /// Builds a full-word read request.
    pub fn read(addr: u32) -> Self {
        Self {
            addr,
            read_enable: true,
            ..Self::default()
        }
    }

    /// Builds a write request with the given byte-enable mask.
    pub fn write(addr: u32, data: u32, byte_enable: u8) -> Self {
        Self {
            addr,
            write_enable: true,
            write_data: data,
            byte_enable,
            ..Self::default()
        }
    }

    /// Returns `true` if the CPU is requesting service this cycle.
    pub fn active(&self) -> bool {
        self.read_enable || self.write_enable
    }
}

/// Per-cycle CPU data-path response.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuResponse {
    /// The request could not complete this cycle; the CPU must hold.
    pub stall: bool,
    /// Read data, present only when a read completed this cycle.
    pub read_data: Option<u32>,
}

/// Merges `data` into `word`, replacing only the bytes selected by `be`.
#[inline]
pub(crate) fn merge_bytes(word: u32, data: u32, be: u8) -> u32 {
    let mut mask = 0u32;
    for i in 0..WORD_BYTES {
        if be & (1 << i) != 0 {
            mask |= 0xFF << (i * 8);
        }
    }
    (word & !mask) | (data & mask)
}

/// One cache line: tag, state bits, and a block of words in address order.
#[derive(Debug, Clone)]
pub struct CacheLine {
    /// Block identity bits.
    pub tag: u32,
    /// Line holds a filled block.
    pub valid: bool,
    /// Line was written since fill and not yet written back.
    pub dirty: bool,
    /// Block contents, word 0 first.
    pub words: Box<[u32]>,
}

impl CacheLine {
    fn new(words_per_line: usize) -> Self {
        Self {
            tag: 0,
            valid: false,
            dirty: false,
            words: vec![0; words_per_line].into_boxed_slice(),
        }
    }
}

/// Set-associative array of cache lines with LRU replacement metadata.
///
/// Lines are indexed `set * ways + way`, mirroring a tag RAM laid out per
/// set. The store performs no transactions itself; its owning engine decides
/// when to look up, fill, or write back.
#[derive(Debug)]
pub struct CacheStore {
    geom: Geometry,
    lines: Vec<CacheLine>,
    lru: LruTracker,
}

impl CacheStore {
    /// Creates an all-invalid store for the given geometry.
    pub fn new(geom: Geometry) -> Self {
        Self {
            geom,
            lines: vec![CacheLine::new(geom.words_per_line); geom.sets * geom.ways],
            lru: LruTracker::new(geom.sets, geom.ways),
        }
    }

    /// The geometry this store was built with.
    pub fn geometry(&self) -> Geometry {
        self.geom
    }

    /// Splits an address using this store's geometry.
    pub fn split(&self, addr: u32) -> AddrParts {
        self.geom.split(addr)
    }

    /// Returns the way holding `tag` in `set`, if any valid line matches.
    pub fn lookup(&self, set: usize, tag: u32) -> Option<usize> {
        (0..self.geom.ways).find(|&way| {
            let line = &self.lines[set * self.geom.ways + way];
            line.valid && line.tag == tag
        })
    }

    /// Marks `way` in `set` as most recently used.
    pub fn touch(&mut self, set: usize, way: usize) {
        self.lru.update(set, way);
    }

    /// Returns the least-recently-used way of `set` (the fill victim).
    pub fn victim(&self, set: usize) -> usize {
        self.lru.victim(set)
    }

    /// Immutable access to a line.
    pub fn line(&self, set: usize, way: usize) -> &CacheLine {
        &self.lines[set * self.geom.ways + way]
    }

    /// Mutable access to a line.
    pub fn line_mut(&mut self, set: usize, way: usize) -> &mut CacheLine {
        &mut self.lines[set * self.geom.ways + way]
    }

    /// Finds any dirty valid line, scanning in (set, way) order.
    pub fn find_dirty(&self) -> Option<(usize, usize)> {
        for set in 0..self.geom.sets {
            for way in 0..self.geom.ways {
                let line = self.line(set, way);
                if line.valid && line.dirty {
                    return Some((set, way));
                }
            }
        }
        None
    }

    /// Invalidates every line and resets replacement metadata.
    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.valid = false;
            line.dirty = false;
            line.tag = 0;
            line.words.fill(0);
        }
        self.lru = LruTracker::new(self.geom.sets, self.geom.ways);
    }
}
