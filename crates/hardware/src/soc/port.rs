//! Wire bundles for the memory-facing ports.
//!
//! Each bundle is the set of signals one side of a port drives during a
//! cycle, grouped per channel the way an AXI-style bus is wired:
//! 1. **Burst port:** Write-address, write-data, write-response, read-address
//!    and read-data channels, with burst length and last-beat marking.
//! 2. **Lite port:** The same five channels reduced to single-beat transfers
//!    with a write strobe.
//!
//! A channel handshake completes in any cycle where one side drives `valid`
//! and the other drives `ready`. Both sides compute their outputs from
//! registered state, so observing the peer's outputs within the same tick is
//! race-free.

/// Identity of a master competing for the external ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    /// Instruction cache engine.
    Instr,
    /// Data-path engine (data cache or no-cache bypass).
    Data,
}

/// Master-driven signals of the burst port.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurstMasterOut {
    /// Write-address channel valid.
    pub awvalid: bool,
    /// Write burst base address.
    pub awaddr: u32,
    /// Write burst length (beats minus one).
    pub awlen: u8,

    /// Write-data channel valid.
    pub wvalid: bool,
    /// Write data for the current beat.
    pub wdata: u32,
    /// Current beat is the last of the burst.
    pub wlast: bool,

    /// Master accepts a write response this cycle.
    pub bready: bool,

    /// Read-address channel valid.
    pub arvalid: bool,
    /// Read burst base address.
    pub araddr: u32,
    /// Read burst length (beats minus one).
    pub arlen: u8,

    /// Master accepts a read beat this cycle.
    pub rready: bool,
}

/// Slave-driven signals of the burst port.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurstSlaveOut {
    /// Slave accepts a write address this cycle.
    pub awready: bool,
    /// Slave accepts a write beat this cycle.
    pub wready: bool,
    /// Write response available.
    pub bvalid: bool,
    /// Slave accepts a read address this cycle.
    pub arready: bool,
    /// Read beat available.
    pub rvalid: bool,
    /// Read data for the current beat.
    pub rdata: u32,
    /// Current read beat is the last of the burst.
    pub rlast: bool,
}

/// Master-driven signals of the lite (single-beat) port.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteMasterOut {
    /// Write-address channel valid.
    pub awvalid: bool,
    /// Write address.
    pub awaddr: u32,

    /// Write-data channel valid.
    pub wvalid: bool,
    /// Write data.
    pub wdata: u32,
    /// Byte strobe: bit `i` enables byte `i` of the word.
    pub wstrb: u8,

    /// Master accepts a write response this cycle.
    pub bready: bool,

    /// Read-address channel valid.
    pub arvalid: bool,
    /// Read address.
    pub araddr: u32,

    /// Master accepts read data this cycle.
    pub rready: bool,
}

/// Slave-driven signals of the lite port.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteSlaveOut {
    /// Slave accepts a write address this cycle.
    pub awready: bool,
    /// Slave accepts write data this cycle.
    pub wready: bool,
    /// Write response available.
    pub bvalid: bool,
    /// Slave accepts a read address this cycle.
    pub arready: bool,
    /// Read data available.
    pub rvalid: bool,
    /// Read data.
    pub rdata: u32,
}
