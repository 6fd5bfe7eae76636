//! Single-beat bypass path.
//!
//! Translates one CPU-facing read or write into exactly one lite-port
//! transaction. The path keeps no state across transactions beyond the
//! handshake position of the one in flight, so back-to-back accesses to
//! different addresses can never be conflated: each transaction carries the
//! address and data it was started with.
//!
//! The path is embedded inside both cache engines to serve their
//! non-cacheable ranges, and [`NoCacheEngine`] wraps it behind the CPU stall
//! interface for fully non-cacheable data regions.

use tracing::trace;

use super::{CpuRequest, CpuResponse};
use crate::soc::port::{LiteMasterOut, LiteSlaveOut};
use crate::stats::CacheStats;

/// Handshake position of the lite transaction in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteState {
    Idle,
    SendWriteReq,
    SendWriteData,
    WaitWriteRes,
    SendReadReq,
    ReceiveReadData,
}

/// Completion event of a lite transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteEvent {
    /// A read completed with the returned word.
    ReadDone(u32),
    /// A write was acknowledged.
    WriteDone,
}

/// One-transaction-at-a-time translator onto the lite port.
#[derive(Debug)]
pub struct LitePath {
    state: LiteState,
    addr: u32,
    wdata: u32,
    wstrb: u8,
}

impl LitePath {
    /// Creates an idle path.
    pub fn new() -> Self {
        Self {
            state: LiteState::Idle,
            addr: 0,
            wdata: 0,
            wstrb: 0,
        }
    }

    /// Returns `true` when no transaction is in flight.
    pub fn idle(&self) -> bool {
        self.state == LiteState::Idle
    }

    /// Starts a single-beat read of `addr`.
    ///
    /// Must only be called while idle.
    pub fn start_read(&mut self, addr: u32) {
        debug_assert!(self.idle(), "lite read started while busy");
        trace!(addr, "lite bypass read");
        self.addr = addr;
        self.state = LiteState::SendReadReq;
    }

    /// Starts a single-beat strobe-masked write of `addr`.
    ///
    /// Must only be called while idle.
    pub fn start_write(&mut self, addr: u32, data: u32, strb: u8) {
        debug_assert!(self.idle(), "lite write started while busy");
        trace!(addr, strb, "lite bypass write");
        self.addr = addr;
        self.wdata = data;
        self.wstrb = strb;
        self.state = LiteState::SendWriteReq;
    }

    /// Combinational master outputs for the current cycle.
    pub fn master_out(&self) -> LiteMasterOut {
        let mut out = LiteMasterOut::default();
        match self.state {
            LiteState::Idle => {}
            LiteState::SendWriteReq => {
                out.awvalid = true;
                out.awaddr = self.addr;
            }
            LiteState::SendWriteData => {
                out.wvalid = true;
                out.wdata = self.wdata;
                out.wstrb = self.wstrb;
            }
            LiteState::WaitWriteRes => out.bready = true,
            LiteState::SendReadReq => {
                out.arvalid = true;
                out.araddr = self.addr;
            }
            LiteState::ReceiveReadData => out.rready = true,
        }
        out
    }

    /// Advances the handshake by one cycle; returns the completion event on
    /// the cycle the transaction finishes.
    pub fn tick(&mut self, s: &LiteSlaveOut) -> Option<LiteEvent> {
        match self.state {
            LiteState::Idle => None,
            LiteState::SendWriteReq => {
                if s.awready {
                    self.state = LiteState::SendWriteData;
                }
                None
            }
            LiteState::SendWriteData => {
                if s.wready {
                    self.state = LiteState::WaitWriteRes;
                }
                None
            }
            LiteState::WaitWriteRes => {
                if s.bvalid {
                    self.state = LiteState::Idle;
                    return Some(LiteEvent::WriteDone);
                }
                None
            }
            LiteState::SendReadReq => {
                if s.arready {
                    self.state = LiteState::ReceiveReadData;
                }
                None
            }
            LiteState::ReceiveReadData => {
                if s.rvalid {
                    self.state = LiteState::Idle;
                    return Some(LiteEvent::ReadDone(s.rdata));
                }
                None
            }
        }
    }

    /// Aborts any in-flight bookkeeping and returns to idle.
    pub fn reset(&mut self) {
        self.state = LiteState::Idle;
    }
}

impl Default for LitePath {
    fn default() -> Self {
        Self::new()
    }
}

/// Stall-interface engine for a fully non-cacheable data region.
///
/// Every access becomes exactly one lite transaction; there is no cache
/// array, no dirty state, and nothing to flush. Stands in for the data cache
/// when the data path is configured cacheless.
#[derive(Debug, Default)]
pub struct NoCacheEngine {
    path: LitePath,
    /// The in-flight transaction is a read.
    pending_read: bool,
    stats: CacheStats,
}

impl NoCacheEngine {
    /// Creates an idle engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a transaction occupies the lite port.
    pub fn lite_busy(&self) -> bool {
        !self.path.idle()
    }

    /// Combinational lite-port master outputs.
    pub fn lite_out(&self) -> LiteMasterOut {
        self.path.master_out()
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Runs one cycle against the CPU request and the lite slave signals.
    pub fn tick(&mut self, req: &CpuRequest, lite: &LiteSlaveOut) -> CpuResponse {
        if self.path.idle() {
            if !req.active() {
                return CpuResponse::default();
            }
            // New access: launch its transaction, stall until it lands.
            if req.write_enable {
                self.stats.lite_writes += 1;
                self.pending_read = false;
                self.path.start_write(req.addr, req.write_data, req.byte_enable);
            } else {
                self.stats.lite_reads += 1;
                self.pending_read = true;
                self.path.start_read(req.addr);
            }
            return CpuResponse {
                stall: true,
                read_data: None,
            };
        }

        match self.path.tick(lite) {
            Some(LiteEvent::ReadDone(word)) => CpuResponse {
                stall: false,
                read_data: self.pending_read.then_some(word),
            },
            Some(LiteEvent::WriteDone) => CpuResponse {
                stall: false,
                read_data: None,
            },
            None => CpuResponse {
                stall: true,
                read_data: None,
            },
        }
    }

    /// Returns the engine to its reset state.
    pub fn reset(&mut self) {
        self.path.reset();
        self.pending_read = false;
    }
}
