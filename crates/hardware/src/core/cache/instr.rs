//! Read-only instruction cache engine.
//!
//! Same tag/set/LRU discipline and full-line fill protocol as the data
//! cache, with no write path and therefore no dirty bits and no write-back.
//! The CPU-facing surface is a two-sided handshake instead of a stall wire:
//!
//! - `req_valid`/`req_ready`: a fetch is accepted in any cycle where both
//!   are high; acceptance latches the address for the whole fill.
//! - `read_valid`/`read_ack`: the response word and its valid flag stay
//!   stable — indefinitely — until the consumer acknowledges them. A
//!   consumer that withholds the ack delays progress but corrupts nothing,
//!   and a request pulse that is never followed through leaves no trace.
//!
//! Non-cacheable fetches (boot ROM, MMIO-mapped code) and fetches with the
//! cache disabled take the embedded lite path, one independent single-beat
//! transaction per fetch.

use tracing::trace;

use super::bypass::{LiteEvent, LitePath};
use super::CacheStore;
use super::data::CacheCsr;
use crate::common::addr::Geometry;
use crate::soc::port::{BurstMasterOut, BurstSlaveOut, LiteMasterOut, LiteSlaveOut};
use crate::stats::CacheStats;

/// One CPU fetch request, sampled every cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstrReq {
    /// A fetch is being requested.
    pub valid: bool,
    /// Word-aligned fetch address.
    pub addr: u32,
}

/// Per-cycle fetch-side response.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstrResp {
    /// The engine accepted a request this cycle if one was presented.
    pub req_ready: bool,
    /// A fetched word is available (held until acknowledged).
    pub read_valid: bool,
    /// The fetched word; meaningful only while `read_valid` is high.
    pub read_data: u32,
}

/// Burst-port position of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    SendReadReq,
    ReceiveReadData,
}

/// Read-only set-associative instruction cache.
#[derive(Debug)]
pub struct InstrCache {
    store: CacheStore,
    state: State,
    lite: LitePath,
    enabled: bool,
    /// Latched fetch being serviced.
    pending_tag: u32,
    pending_set: usize,
    pending_word: usize,
    fill_way: usize,
    beat: usize,
    /// Completed fetch held until the consumer acknowledges it.
    resp: Option<u32>,
    stats: CacheStats,
}

impl InstrCache {
    /// Creates an all-invalid cache with the given geometry.
    ///
    /// With `enabled == false` every fetch bypasses the array over the lite
    /// port.
    pub fn new(geom: Geometry, enabled: bool) -> Self {
        Self {
            store: CacheStore::new(geom),
            state: State::Idle,
            lite: LitePath::new(),
            enabled,
            pending_tag: 0,
            pending_set: 0,
            pending_word: 0,
            fill_way: 0,
            beat: 0,
            resp: None,
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

    /// Returns `true` while a fetch is being serviced (the fetch path's
    /// contribution to the subsystem's combined stall).
    pub fn busy(&self) -> bool {
        self.burst_busy() || self.lite_busy()
    }

    /// Combinational burst-port outputs for the current cycle.
    pub fn burst_out(&self) -> BurstMasterOut {
        let geom = self.store.geometry();
        let mut out = BurstMasterOut::default();
        match self.state {
            State::Idle => {}
            State::SendReadReq => {
                out.arvalid = true;
                out.araddr = geom.line_base(self.pending_tag, self.pending_set);
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

    /// Runs one cycle against the fetch request and the slave-side signals
    /// of whichever external ports this engine currently owns.
    pub fn tick(
        &mut self,
        req: &InstrReq,
        read_ack: bool,
        csr: &CacheCsr,
        bus: &BurstSlaveOut,
        lite: &LiteSlaveOut,
    ) -> InstrResp {
        let ready = self.state == State::Idle && self.lite.idle() && self.resp.is_none();

        if !self.lite.idle() {
            if let Some(LiteEvent::ReadDone(word)) = self.lite.tick(lite) {
                self.resp = Some(word);
            }
        } else {
            match self.state {
                State::Idle => {
                    if ready && req.valid {
                        self.accept(req.addr, csr);
                    }
                }
                State::SendReadReq => {
                    if bus.arready {
                        self.beat = 0;
                        self.state = State::ReceiveReadData;
                    }
                }
                State::ReceiveReadData => {
                    if bus.rvalid {
                        let line = self.store.line_mut(self.pending_set, self.fill_way);
                        line.words[self.beat] = bus.rdata;
                        self.beat += 1;
                        if bus.rlast {
                            line.tag = self.pending_tag;
                            line.valid = true;
                            self.store.touch(self.pending_set, self.fill_way);
                            self.resp = Some(
                                self.store.line(self.pending_set, self.fill_way).words
                                    [self.pending_word],
                            );
                            self.state = State::Idle;
                        }
                    }
                }
            }
        }

        let read_valid = self.resp.is_some();
        let read_data = self.resp.unwrap_or(0);
        if read_valid && read_ack {
            self.resp = None;
        }
        InstrResp {
            req_ready: ready,
            read_valid,
            read_data,
        }
    }

    /// Returns the engine to its reset state, invalidating every line.
    pub fn reset(&mut self) {
        self.store.reset();
        self.state = State::Idle;
        self.lite.reset();
        self.resp = None;
        self.beat = 0;
    }

    /// Accepts a fetch: answer from a resident line, or latch and fill.
    fn accept(&mut self, addr: u32, csr: &CacheCsr) {
        if !self.enabled || csr.non_cacheable(addr) {
            self.stats.lite_reads += 1;
            self.lite.start_read(addr);
            return;
        }

        let parts = self.store.split(addr);
        if let Some(way) = self.store.lookup(parts.set, parts.tag) {
            self.stats.hits += 1;
            self.store.touch(parts.set, way);
            self.resp = Some(self.store.line(parts.set, way).words[parts.word]);
            return;
        }

        self.stats.misses += 1;
        self.pending_tag = parts.tag;
        self.pending_set = parts.set;
        self.pending_word = parts.word;
        self.fill_way = self.store.victim(parts.set);
        if self.store.line(parts.set, self.fill_way).valid {
            self.stats.evictions += 1;
        }
        trace!(addr, set = parts.set, way = self.fill_way, "fetch miss accepted");
        self.state = State::SendReadReq;
    }
}
