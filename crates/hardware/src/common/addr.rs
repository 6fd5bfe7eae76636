//! Cache geometry and address decomposition.
//!
//! A 32-bit byte address splits into `[tag | set | word | byte]` fields whose
//! widths are derived from the cache configuration (total size, associativity,
//! line size). This module provides:
//! 1. **Geometry:** Validated set/way/line dimensions for one cache.
//! 2. **Decomposition:** Splitting an address into its cache-indexing fields.
//! 3. **Reconstruction:** Rebuilding a line's base address from tag and set.

use super::constants::BYTE_OFFSET_BITS;
use super::error::MemError;
use crate::config::CacheConfig;

/// Validated cache dimensions derived from a [`CacheConfig`].
///
/// All dimensions are powers of two so the address fields are contiguous bit
/// ranges, exactly as a hardware tag/index split would be wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Associativity (lines per set).
    pub ways: usize,
    /// Number of sets.
    pub sets: usize,
    /// Words per cache line.
    pub words_per_line: usize,
}

/// An address split into cache-indexing fields.
///
/// The byte offset is not carried: all accesses are word-aligned and sub-word
/// selection travels in the byte-enable mask instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrParts {
    /// Block identity bits above set and offset.
    pub tag: u32,
    /// Set index selecting exactly one cache set.
    pub set: usize,
    /// Word offset within the line, in address order.
    pub word: usize,
}

impl Geometry {
    /// Derives a geometry from a cache configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::Geometry`] when the configuration cannot be mapped
    /// onto a power-of-two set/way/line layout.
    pub fn from_config(config: &CacheConfig) -> Result<Self, MemError> {
        let fail = |reason: &str| MemError::Geometry {
            reason: reason.to_string(),
        };

        if config.ways == 0 {
            return Err(fail("associativity must be at least 1"));
        }
        if config.line_bytes < 4 || !config.line_bytes.is_power_of_two() {
            return Err(fail("line size must be a power of two of at least one word"));
        }
        if config.size_bytes == 0 || !config.size_bytes.is_power_of_two() {
            return Err(fail("cache size must be a power of two"));
        }

        let num_lines = config.size_bytes / config.line_bytes;
        if num_lines == 0 || num_lines % config.ways != 0 {
            return Err(fail("cache size must hold a whole number of sets"));
        }

        let sets = num_lines / config.ways;
        if !sets.is_power_of_two() || !config.ways.is_power_of_two() {
            return Err(fail("sets and ways must be powers of two"));
        }

        Ok(Self {
            ways: config.ways,
            sets,
            words_per_line: config.line_bytes / 4,
        })
    }

    /// Bits of the word-offset field.
    #[inline]
    fn word_bits(&self) -> u32 {
        self.words_per_line.trailing_zeros()
    }

    /// Bits of the set-index field.
    #[inline]
    fn set_bits(&self) -> u32 {
        self.sets.trailing_zeros()
    }

    /// Splits a byte address into tag, set index, and word offset.
    #[inline]
    pub fn split(&self, addr: u32) -> AddrParts {
        let word_idx = addr >> BYTE_OFFSET_BITS;
        AddrParts {
            word: (word_idx as usize) & (self.words_per_line - 1),
            set: ((word_idx >> self.word_bits()) as usize) & (self.sets - 1),
            tag: word_idx >> (self.word_bits() + self.set_bits()),
        }
    }

    /// Reconstructs the base byte address of the line `(tag, set)`.
    ///
    /// Composing with [`Geometry::split`] reproduces the original address's
    /// high bits exactly; adding `word * 4` restores the low bits.
    #[inline]
    pub fn line_base(&self, tag: u32, set: usize) -> u32 {
        ((tag << self.set_bits()) | set as u32) << (self.word_bits() + BYTE_OFFSET_BITS)
    }

    /// Line size in bytes.
    #[inline]
    pub fn line_bytes(&self) -> usize {
        self.words_per_line * 4
    }

    /// Burst length field for a full-line transfer (beats minus one).
    #[inline]
    pub fn burst_len(&self) -> u8 {
        (self.words_per_line - 1) as u8
    }
}
