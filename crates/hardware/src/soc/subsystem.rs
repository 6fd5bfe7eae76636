//! Top-level memory subsystem.
//!
//! Composes the instruction cache, the data path (cache or no-cache bypass),
//! the request arbiter, and both backing RAMs behind a single CPU-facing
//! surface. One call to [`MemorySubsystem::tick`] advances the whole
//! subsystem by one clock cycle:
//!
//! 1. Grants are decided from the engines' pre-tick demand.
//! 2. The granted engines' combinational master outputs are routed to the
//!    RAM models; everything is computed from registered state, so signal
//!    exchange within the tick is race-free.
//! 3. The RAMs and engines register their next state; ungranted engines
//!    observe an all-idle slave bundle and make no progress.
//!
//! The instruction and data paths are independent ports into the CPU; the
//! combined `stall` output is simply the OR of their individual conditions.

use crate::common::addr::Geometry;
use crate::common::error::MemError;
use crate::config::Config;
use crate::core::cache::bypass::NoCacheEngine;
use crate::core::cache::data::{CacheCsr, DataCache};
use crate::core::cache::instr::{InstrCache, InstrReq, InstrResp};
use crate::core::cache::{CpuRequest, CpuResponse};
use crate::soc::arbiter::RequestArbiter;
use crate::soc::memory::{BurstRam, LiteRam};
use crate::soc::port::{BurstSlaveOut, LiteSlaveOut, Requester};
use crate::stats::{StatsReport, SubsystemStats};

/// Returns the real slave bundle only to the port's current owner.
fn gate<'a, T>(grant: Option<Requester>, who: Requester, real: &'a T, idle: &'a T) -> &'a T {
    if grant == Some(who) { real } else { idle }
}

/// The data-path engine variant selected by configuration.
#[derive(Debug)]
enum DataEngine {
    /// Write-back set-associative data cache.
    Cached(DataCache),
    /// Fully non-cacheable data path.
    Uncached(NoCacheEngine),
}

/// Combined CPU-facing outputs of one subsystem cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsystemOutput {
    /// Instruction-path response.
    pub instr: InstrResp,
    /// Data-path response.
    pub data: CpuResponse,
    /// OR of the instruction-path and data-path stall conditions.
    pub stall: bool,
}

/// The complete memory subsystem behind the CPU.
#[derive(Debug)]
pub struct MemorySubsystem {
    icache: InstrCache,
    data: DataEngine,
    arbiter: RequestArbiter,
    ram: BurstRam,
    lite_ram: LiteRam,
    csr: CacheCsr,
    stats: SubsystemStats,
}

impl MemorySubsystem {
    /// Builds a subsystem from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MemError`] when a cache geometry is invalid or the initial
    /// non-cacheable range is inverted.
    pub fn new(config: &Config) -> Result<Self, MemError> {
        if config.system.non_cacheable_base > config.system.non_cacheable_limit {
            return Err(MemError::Range {
                base: config.system.non_cacheable_base,
                limit: config.system.non_cacheable_limit,
            });
        }

        let i_geom = Geometry::from_config(&config.cache.l1_i)?;
        let data = if config.cache.l1_d.enabled {
            DataEngine::Cached(DataCache::new(Geometry::from_config(&config.cache.l1_d)?))
        } else {
            DataEngine::Uncached(NoCacheEngine::new())
        };

        Ok(Self {
            icache: InstrCache::new(i_geom, config.cache.l1_i.enabled),
            data,
            arbiter: RequestArbiter::new(),
            ram: BurstRam::new(config.memory.main_size),
            lite_ram: LiteRam::new(config.memory.lite_size),
            csr: CacheCsr {
                non_cacheable_base: config.system.non_cacheable_base,
                non_cacheable_limit: config.system.non_cacheable_limit,
                flush_order: false,
            },
            stats: SubsystemStats::default(),
        })
    }

    /// Advances the subsystem by one cycle.
    ///
    /// `instr`/`read_ack` drive the fetch-side handshake; `data` carries the
    /// data-path request. Responses are valid for this cycle only, except
    /// the fetch response word, which the instruction engine holds stable
    /// until acknowledged.
    pub fn tick(&mut self, instr: &InstrReq, read_ack: bool, data: &CpuRequest) -> SubsystemOutput {
        let grants = self.arbiter.arbitrate(
            self.icache.burst_busy(),
            match &self.data {
                DataEngine::Cached(c) => c.burst_busy(),
                DataEngine::Uncached(_) => false,
            },
            self.icache.lite_busy(),
            match &self.data {
                DataEngine::Cached(c) => c.lite_busy(),
                DataEngine::Uncached(n) => n.lite_busy(),
            },
        );

        // Route the granted masters' outputs to the RAMs.
        let burst_m = match grants.burst {
            Some(Requester::Instr) => self.icache.burst_out(),
            Some(Requester::Data) => match &self.data {
                DataEngine::Cached(c) => c.burst_out(),
                DataEngine::Uncached(_) => Default::default(),
            },
            None => Default::default(),
        };
        let lite_m = match grants.lite {
            Some(Requester::Instr) => self.icache.lite_out(),
            Some(Requester::Data) => match &self.data {
                DataEngine::Cached(c) => c.lite_out(),
                DataEngine::Uncached(n) => n.lite_out(),
            },
            None => Default::default(),
        };

        let burst_s = self.ram.slave_out();
        let lite_s = self.lite_ram.slave_out();
        self.ram.tick(&burst_m);
        self.lite_ram.tick(&lite_m);

        // Each engine sees the real slave bundle only while it owns the port.
        let idle_burst = BurstSlaveOut::default();
        let idle_lite = LiteSlaveOut::default();
        let d_burst = gate(grants.burst, Requester::Data, &burst_s, &idle_burst);
        let d_lite = gate(grants.lite, Requester::Data, &lite_s, &idle_lite);
        let i_burst = gate(grants.burst, Requester::Instr, &burst_s, &idle_burst);
        let i_lite = gate(grants.lite, Requester::Instr, &lite_s, &idle_lite);

        let data_resp = match &mut self.data {
            DataEngine::Cached(c) => c.tick(data, &mut self.csr, d_burst, d_lite),
            DataEngine::Uncached(n) => n.tick(data, d_lite),
        };
        let instr_resp = self.icache.tick(instr, read_ack, &self.csr, i_burst, i_lite);

        self.stats.cycles += 1;
        if data_resp.stall {
            self.stats.data_stall_cycles += 1;
        }

        SubsystemOutput {
            instr: instr_resp,
            data: data_resp,
            stall: data_resp.stall || self.icache.busy(),
        }
    }

    /// Reprograms the non-cacheable range.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::Range`] when `base > limit`; the previous range
    /// is kept in that case.
    pub fn set_non_cacheable_range(&mut self, base: u32, limit: u32) -> Result<(), MemError> {
        if base > limit {
            return Err(MemError::Range { base, limit });
        }
        self.csr.non_cacheable_base = base;
        self.csr.non_cacheable_limit = limit;
        Ok(())
    }

    /// Pulses the manual flush order; the data cache consumes it the next
    /// time it is idle.
    pub fn flush(&mut self) {
        self.csr.flush_order = true;
    }

    /// Loads a byte image into the burst RAM.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::ImageOverflow`] when the image does not fit.
    pub fn load_image(&mut self, data: &[u8], offset: usize) -> Result<(), MemError> {
        self.ram.load(data, offset)
    }

    /// Direct access to the burst RAM (image loading, golden comparison).
    pub fn ram(&mut self) -> &mut BurstRam {
        &mut self.ram
    }

    /// Direct access to the lite RAM.
    pub fn lite_ram(&mut self) -> &mut LiteRam {
        &mut self.lite_ram
    }

    /// Read access to the instruction cache engine.
    pub fn icache(&self) -> &InstrCache {
        &self.icache
    }

    /// Read access to the data cache engine, when the data path is cached.
    pub fn dcache(&self) -> Option<&DataCache> {
        match &self.data {
            DataEngine::Cached(c) => Some(c),
            DataEngine::Uncached(_) => None,
        }
    }

    /// Snapshot of all statistics counters.
    pub fn stats(&self) -> StatsReport {
        StatsReport {
            subsystem: self.stats,
            instr: *self.icache.stats(),
            data: match &self.data {
                DataEngine::Cached(c) => *c.stats(),
                DataEngine::Uncached(n) => *n.stats(),
            },
        }
    }

    /// System reset: invalidates both cache arrays and frees the ports.
    ///
    /// RAM contents survive, as external memory would across a core reset.
    pub fn reset(&mut self) {
        self.icache.reset();
        match &mut self.data {
            DataEngine::Cached(c) => c.reset(),
            DataEngine::Uncached(n) => n.reset(),
        }
        self.arbiter.reset();
        self.csr.flush_order = false;
    }
}
