//! Configuration system for the memory-subsystem simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (RAM sizes, cache geometry).
//! 2. **Structures:** Hierarchical config for system, memory, and caches.
//!
//! Configuration is supplied as JSON (e.g. from a file handed to the CLI) or
//! via `Config::default()`.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden.
mod defaults {
    /// Size of the burst-addressable main RAM (1 MiB).
    pub const MAIN_RAM_SIZE: usize = 1 << 20;

    /// Size of the lite-addressable RAM backing non-cacheable traffic (1 MiB).
    pub const LITE_RAM_SIZE: usize = 1 << 20;

    /// Default cache size in bytes (1 KiB).
    pub const CACHE_SIZE: usize = 1024;

    /// Default cache line size in bytes (64 bytes = 16 words).
    pub const CACHE_LINE: usize = 64;

    /// Default cache associativity (2-way set-associative).
    pub const CACHE_WAYS: usize = 2;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use memsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.cache.l1_d.size_bytes, 1024);
/// assert_eq!(config.cache.l1_d.ways, 2);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use memsim_core::config::Config;
///
/// let json = r#"{
///     "system": {
///         "non_cacheable_base": 8192,
///         "non_cacheable_limit": 16384
///     },
///     "memory": {
///         "main_size": 1048576,
///         "lite_size": 65536
///     },
///     "cache": {
///         "l1_i": { "enabled": true, "size_bytes": 1024, "line_bytes": 64, "ways": 2 },
///         "l1_d": { "enabled": true, "size_bytes": 2048, "line_bytes": 64, "ways": 2 }
///     }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.cache.l1_d.size_bytes, 2048);
/// assert_eq!(config.system.non_cacheable_base, 8192);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Non-cacheable range and other system-level settings.
    #[serde(default)]
    pub system: SystemConfig,
    /// Backing-store sizes.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Instruction and data cache geometry.
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
}

/// System-level settings: the initial non-cacheable address range.
///
/// The range is half-open `[base, limit)` and may be reprogrammed at runtime
/// through the subsystem's CSR-style setter.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Non-cacheable range base (inclusive).
    #[serde(default)]
    pub non_cacheable_base: u32,

    /// Non-cacheable range limit (exclusive).
    #[serde(default)]
    pub non_cacheable_limit: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            non_cacheable_base: 0,
            non_cacheable_limit: 0,
        }
    }
}

/// Backing-store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Burst-addressable main RAM size in bytes.
    #[serde(default = "MemoryConfig::default_main_size")]
    pub main_size: usize,

    /// Lite-addressable RAM size in bytes.
    #[serde(default = "MemoryConfig::default_lite_size")]
    pub lite_size: usize,
}

impl MemoryConfig {
    /// Returns the default main RAM size in bytes.
    fn default_main_size() -> usize {
        defaults::MAIN_RAM_SIZE
    }

    /// Returns the default lite RAM size in bytes.
    fn default_lite_size() -> usize {
        defaults::LITE_RAM_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            main_size: defaults::MAIN_RAM_SIZE,
            lite_size: defaults::LITE_RAM_SIZE,
        }
    }
}

/// Cache hierarchy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache.
    #[serde(default)]
    pub l1_i: CacheConfig,
    /// L1 data cache.
    #[serde(default)]
    pub l1_d: CacheConfig,
}

/// Individual cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Enable this cache. When disabled, every access on the corresponding
    /// path bypasses the cache array and is served over the lite port.
    #[serde(default = "CacheConfig::default_enabled")]
    pub enabled: bool,

    /// Total cache size in bytes.
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways).
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,
}

impl CacheConfig {
    /// Caches are enabled unless explicitly turned off.
    fn default_enabled() -> bool {
        true
    }

    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity (number of ways).
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
        }
    }
}
