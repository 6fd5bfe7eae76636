//! Simulation statistics collection and reporting.
//!
//! This module tracks behavioral counters for the memory subsystem. It
//! provides:
//! 1. **Per-engine counters:** Hits, misses, evictions, write-backs, flushed
//!    lines, and lite-port traffic.
//! 2. **Subsystem counters:** Elapsed cycles and data-path stall cycles.
//! 3. **Reporting:** A displayable snapshot combining both.

use std::fmt;

/// Behavioral counters for one cache engine (or the no-cache path).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from a resident line.
    pub hits: u64,
    /// Requests that required a line fill.
    pub misses: u64,
    /// Fills that displaced a valid line.
    pub evictions: u64,
    /// Dirty lines written back (evictions and flushes).
    pub writebacks: u64,
    /// Lines written back by manual flush.
    pub flushed_lines: u64,
    /// Single-beat reads on the lite port.
    pub lite_reads: u64,
    /// Single-beat writes on the lite port.
    pub lite_writes: u64,
}

impl CacheStats {
    /// Hit rate over cacheable accesses, or 0 when none occurred.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Subsystem-level counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubsystemStats {
    /// Total simulated cycles.
    pub cycles: u64,
    /// Cycles in which the data path stalled the CPU.
    pub data_stall_cycles: u64,
}

/// Point-in-time snapshot of all counters, printable as a report.
#[derive(Debug, Clone, Copy)]
pub struct StatsReport {
    /// Subsystem-level counters.
    pub subsystem: SubsystemStats,
    /// Instruction-path counters.
    pub instr: CacheStats,
    /// Data-path counters.
    pub data: CacheStats,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== memory subsystem statistics ===")?;
        writeln!(f, "cycles:             {}", self.subsystem.cycles)?;
        writeln!(f, "data stall cycles:  {}", self.subsystem.data_stall_cycles)?;
        for (name, s) in [("instr", &self.instr), ("data ", &self.data)] {
            writeln!(
                f,
                "{name}: hits {:>8}  misses {:>6}  hit rate {:>6.2}%",
                s.hits,
                s.misses,
                s.hit_rate() * 100.0
            )?;
            writeln!(
                f,
                "       evictions {:>4}  writebacks {:>4}  flushed {:>4}  lite r/w {}/{}",
                s.evictions, s.writebacks, s.flushed_lines, s.lite_reads, s.lite_writes
            )?;
        }
        Ok(())
    }
}
