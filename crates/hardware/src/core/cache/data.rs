//! Write-back set-associative data cache engine.
//!
//! The engine is a registered state machine stepped once per cycle:
//! 1. **Hit path:** A resident line answers combinationally — the response
//!    comes back in the same tick the request is presented, with no stall.
//! 2. **Miss path:** The request is latched at acceptance, the victim's
//!    dirty contents are written back as a full-line burst to the victim's
//!    old address, a full-line read burst fills the new block, and the
//!    latched request is completed from the freshly filled line.
//! 3. **Flush:** A CSR-ordered flush walks every dirty line, writing each
//!    back and leaving it valid and clean, without touching any request
//!    fields.
//! 4. **Bypass:** Addresses inside the non-cacheable range never reach the
//!    cache array; each such access becomes exactly one lite transaction.
//!
//! The latched request is authoritative for the whole miss: the live CPU
//! inputs may change while the fill is in flight (the next fetch address can
//! appear early) and must not influence tag comparison or data placement.

use tracing::{debug, trace};

use super::bypass::{LiteEvent, LitePath};
use super::{CacheStore, CpuRequest, CpuResponse, merge_bytes};
use crate::common::addr::{AddrParts, Geometry};
use crate::soc::port::{BurstMasterOut, BurstSlaveOut, LiteMasterOut, LiteSlaveOut};
use crate::stats::CacheStats;

/// CSR-backed runtime configuration visible to the cache engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheCsr {
    /// Non-cacheable range base (inclusive).
    pub non_cacheable_base: u32,
    /// Non-cacheable range limit (exclusive).
    pub non_cacheable_limit: u32,
    /// Pulsed flush order; consumed by the data cache when it begins (or
    /// trivially completes) a flush.
    pub flush_order: bool,
}

impl CacheCsr {
    /// Returns `true` if `addr` falls inside the non-cacheable range.
    #[inline]
    pub fn non_cacheable(&self, addr: u32) -> bool {
        addr >= self.non_cacheable_base && addr < self.non_cacheable_limit
    }
}

/// Burst-port position of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    SendWriteReq,
    SendWriteData,
    WaitWriteRes,
    /// Between two write-backs of a flush walk: the next dirty line has been
    /// selected and the write request re-arms next cycle.
    FlushNext,
    SendReadReq,
    ReceiveReadData,
}

/// The request latched when a miss is accepted.
#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    addr: u32,
    tag: u32,
    set: usize,
    word: usize,
    write: bool,
    wdata: u32,
    be: u8,
}

impl Pending {
    fn latch(req: &CpuRequest, parts: AddrParts) -> Self {
        Self {
            addr: req.addr,
            tag: parts.tag,
            set: parts.set,
            word: parts.word,
            write: req.write_enable,
            wdata: req.write_data,
            be: req.byte_enable,
        }
    }
}

/// Write-back, set-associative data cache.
#[derive(Debug)]
pub struct DataCache {
    store: CacheStore,
    state: State,
    lite: LitePath,
    /// Latched request being serviced by the burst path.
    pending: Pending,
    /// Way being filled for the pending request.
    fill_way: usize,
    /// Line currently being written back (miss eviction or flush walk).
    wb_set: usize,
    wb_way: usize,
    /// Beat counter within the current burst.
    beat: usize,
    /// A manual flush walk is in progress.
    flushing: bool,
    /// The in-flight lite transaction is a read.
    lite_read: bool,
    stats: CacheStats,
}

impl DataCache {
    /// Creates an all-invalid cache with the given geometry.
    pub fn new(geom: Geometry) -> Self {
        Self {
            store: CacheStore::new(geom),
            state: State::Idle,
            lite: LitePath::new(),
            pending: Pending::default(),
            fill_way: 0,
            wb_set: 0,
            wb_way: 0,
            beat: 0,
            flushing: false,
            lite_read: false,
            stats: CacheStats::default(),
        }
    }

    /// Read access to the line storage (used by tests and debug tooling).
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Returns `true` while the burst port is needed.
    pub fn burst_busy(&self) -> bool {
        self.state != State::Idle
    }

    /// Returns `true` while the lite port is needed.
    pub fn lite_busy(&self) -> bool {
        !self.lite.idle()
    }

    /// Combinational burst-port outputs for the current cycle.
    pub fn burst_out(&self) -> BurstMasterOut {
        let geom = self.store.geometry();
        let mut out = BurstMasterOut::default();
        match self.state {
            State::Idle | State::FlushNext => {}
            State::SendWriteReq => {
                let line = self.store.line(self.wb_set, self.wb_way);
                out.awvalid = true;
                out.awaddr = geom.line_base(line.tag, self.wb_set);
                out.awlen = geom.burst_len();
            }
            State::SendWriteData => {
                let line = self.store.line(self.wb_set, self.wb_way);
                out.wvalid = true;
                out.wdata = line.words[self.beat];
                out.wlast = self.beat + 1 == geom.words_per_line;
            }
            State::WaitWriteRes => out.bready = true,
            State::SendReadReq => {
                out.arvalid = true;
                out.araddr = geom.line_base(self.pending.tag, self.pending.set);
                out.arlen = geom.burst_len();
            }
            State::ReceiveReadData => out.rready = true,
        }
        out
    }

    /// Combinational lite-port outputs for the current cycle.
    pub fn lite_out(&self) -> LiteMasterOut {
        self.lite.master_out()
    }

    /// Runs one cycle.
    ///
    /// `req` carries the live CPU inputs, `csr` the runtime configuration
    /// (the flush pulse is consumed here), and `bus`/`lite` the slave-side
    /// signals of whichever external ports this engine currently owns (an
    /// all-idle bundle when it does not own the port).
    pub fn tick(
        &mut self,
        req: &CpuRequest,
        csr: &mut CacheCsr,
        bus: &BurstSlaveOut,
        lite: &LiteSlaveOut,
    ) -> CpuResponse {
        debug_assert!(
            !(req.read_enable && req.write_enable),
            "read_enable and write_enable are mutually exclusive"
        );

        // The bypass sub-machine runs to completion before anything else is
        // considered; each lite access is an independent transaction.
        if !self.lite.idle() {
            return match self.lite.tick(lite) {
                Some(LiteEvent::ReadDone(word)) => CpuResponse {
                    stall: false,
                    read_data: self.lite_read.then_some(word),
                },
                Some(LiteEvent::WriteDone) => CpuResponse {
                    stall: false,
                    read_data: None,
                },
                None => CpuResponse {
                    stall: true,
                    read_data: None,
                },
            };
        }

        match self.state {
            State::Idle => self.tick_idle(req, csr),
            State::SendWriteReq => {
                if bus.awready {
                    self.beat = 0;
                    self.state = State::SendWriteData;
                }
                Self::stalled()
            }
            State::SendWriteData => {
                if bus.wready {
                    self.beat += 1;
                    if self.beat == self.store.geometry().words_per_line {
                        self.state = State::WaitWriteRes;
                    }
                }
                Self::stalled()
            }
            State::WaitWriteRes => {
                if bus.bvalid {
                    self.finish_writeback();
                }
                Self::stalled()
            }
            State::FlushNext => {
                self.state = State::SendWriteReq;
                Self::stalled()
            }
            State::SendReadReq => {
                if bus.arready {
                    self.beat = 0;
                    self.state = State::ReceiveReadData;
                }
                Self::stalled()
            }
            State::ReceiveReadData => self.tick_fill(bus),
        }
    }

    /// Returns the engine to its reset state, invalidating every line.
    pub fn reset(&mut self) {
        self.store.reset();
        self.state = State::Idle;
        self.lite.reset();
        self.flushing = false;
        self.beat = 0;
    }

    fn stalled() -> CpuResponse {
        CpuResponse {
            stall: true,
            read_data: None,
        }
    }

    /// Idle-state arbitration between flush, bypass, hit, and miss.
    fn tick_idle(&mut self, req: &CpuRequest, csr: &mut CacheCsr) -> CpuResponse {
        if csr.flush_order {
            csr.flush_order = false;
            if let Some((set, way)) = self.store.find_dirty() {
                debug!(set, way, "flush walk started");
                self.flushing = true;
                self.wb_set = set;
                self.wb_way = way;
                self.state = State::SendWriteReq;
                return Self::stalled();
            }
            // Nothing dirty: the flush completes immediately and the
            // request on the inputs is served below as usual.
        }

        if !req.active() {
            return CpuResponse::default();
        }

        if csr.non_cacheable(req.addr) {
            if req.write_enable {
                self.stats.lite_writes += 1;
                self.lite_read = false;
                self.lite.start_write(req.addr, req.write_data, req.byte_enable);
            } else {
                self.stats.lite_reads += 1;
                self.lite_read = true;
                self.lite.start_read(req.addr);
            }
            return Self::stalled();
        }

        let parts = self.store.split(req.addr);
        if let Some(way) = self.store.lookup(parts.set, parts.tag) {
            return self.serve_hit(req, parts, way);
        }

        // Miss: latch the request now; the live inputs are dead to us until
        // the fill completes.
        self.stats.misses += 1;
        self.pending = Pending::latch(req, parts);
        self.fill_way = self.store.victim(parts.set);
        let victim = self.store.line(parts.set, self.fill_way);
        trace!(
            addr = req.addr,
            set = parts.set,
            way = self.fill_way,
            dirty = victim.dirty,
            "miss accepted"
        );
        if victim.valid {
            self.stats.evictions += 1;
        }
        if victim.valid && victim.dirty {
            self.wb_set = parts.set;
            self.wb_way = self.fill_way;
            self.state = State::SendWriteReq;
        } else {
            self.state = State::SendReadReq;
        }
        Self::stalled()
    }

    /// Serves a resident line in the same cycle.
    fn serve_hit(&mut self, req: &CpuRequest, parts: AddrParts, way: usize) -> CpuResponse {
        self.stats.hits += 1;
        self.store.touch(parts.set, way);
        if req.write_enable {
            // A zero byte-enable writes nothing and must leave the line clean.
            if req.byte_enable != 0 {
                let line = self.store.line_mut(parts.set, way);
                line.words[parts.word] =
                    merge_bytes(line.words[parts.word], req.write_data, req.byte_enable);
                line.dirty = true;
            }
            CpuResponse {
                stall: false,
                read_data: None,
            }
        } else {
            CpuResponse {
                stall: false,
                read_data: Some(self.store.line(parts.set, way).words[parts.word]),
            }
        }
    }

    /// Write response landed: the written-back line is clean again.
    fn finish_writeback(&mut self) {
        self.stats.writebacks += 1;
        self.store.line_mut(self.wb_set, self.wb_way).dirty = false;
        if self.flushing {
            self.stats.flushed_lines += 1;
            if let Some((set, way)) = self.store.find_dirty() {
                self.wb_set = set;
                self.wb_way = way;
                self.state = State::FlushNext;
            } else {
                debug!("flush walk complete");
                self.flushing = false;
                self.state = State::Idle;
            }
        } else {
            self.state = State::SendReadReq;
        }
    }

    /// Streams fill beats; on the last beat, completes the latched request.
    fn tick_fill(&mut self, bus: &BurstSlaveOut) -> CpuResponse {
        if !bus.rvalid {
            return Self::stalled();
        }

        let pending = self.pending;
        let line = self.store.line_mut(pending.set, self.fill_way);
        line.words[self.beat] = bus.rdata;
        self.beat += 1;

        if !bus.rlast {
            return Self::stalled();
        }

        line.tag = pending.tag;
        line.valid = true;
        line.dirty = false;
        self.store.touch(pending.set, self.fill_way);
        self.state = State::Idle;
        trace!(addr = pending.addr, "fill complete");

        // Complete the latched request, never the live one.
        if pending.write {
            if pending.be != 0 {
                let line = self.store.line_mut(pending.set, self.fill_way);
                line.words[pending.word] =
                    merge_bytes(line.words[pending.word], pending.wdata, pending.be);
                line.dirty = true;
            }
            CpuResponse {
                stall: false,
                read_data: None,
            }
        } else {
            CpuResponse {
                stall: false,
                read_data: Some(self.store.line(pending.set, self.fill_way).words[pending.word]),
            }
        }
    }
}
