//! System-wide constants.
//!
//! Word geometry for the 32-bit data path. All CPU-facing accesses are
//! word-aligned; sub-word stores are expressed through the byte-enable mask.

/// Bytes per bus word (32-bit data path).
pub const WORD_BYTES: usize = 4;

/// Byte-enable mask selecting all four bytes of a word.
pub const BYTE_ENABLE_ALL: u8 = 0b1111;

/// Number of low address bits covered by the byte offset within a word.
pub const BYTE_OFFSET_BITS: u32 = 2;
