//! Burst-capable backing RAM.
//!
//! Models the external memory reached through the burst port: a flat byte
//! array behind a five-channel slave state machine. Exactly one transaction
//! is in flight at a time; a request is accepted in the idle state and the
//! transfer then streams one beat per cycle until the last beat or the write
//! response completes.

use tracing::trace;

use crate::common::error::MemError;
use crate::soc::port::{BurstMasterOut, BurstSlaveOut};

/// Slave-side channel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Ready to accept a read or write address.
    Idle,
    /// Streaming read beats back to the master.
    Read { addr: u32, beat: usize, beats: usize },
    /// Consuming write beats from the master.
    Write { addr: u32, beat: usize, beats: usize },
    /// Presenting the write response.
    WriteResp,
}

/// Byte-addressable burst RAM model.
#[derive(Debug)]
pub struct BurstRam {
    bytes: Vec<u8>,
    state: State,
}

impl BurstRam {
    /// Creates a zero-filled RAM of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            state: State::Idle,
        }
    }

    /// Size of the RAM in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the RAM has zero capacity.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads a little-endian word directly, bypassing the port.
    pub fn read_u32(&self, addr: u32) -> u32 {
        let a = addr as usize;
        assert!(a + 4 <= self.bytes.len(), "burst RAM read out of bounds");
        u32::from_le_bytes([
            self.bytes[a],
            self.bytes[a + 1],
            self.bytes[a + 2],
            self.bytes[a + 3],
        ])
    }

    /// Writes a little-endian word directly, bypassing the port.
    pub fn write_u32(&mut self, addr: u32, val: u32) {
        let a = addr as usize;
        assert!(a + 4 <= self.bytes.len(), "burst RAM write out of bounds");
        self.bytes[a..a + 4].copy_from_slice(&val.to_le_bytes());
    }

    /// Loads a byte image at the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`MemError::ImageOverflow`] when the image does not fit.
    pub fn load(&mut self, data: &[u8], offset: usize) -> Result<(), MemError> {
        if offset + data.len() > self.bytes.len() {
            return Err(MemError::ImageOverflow {
                len: data.len(),
                offset,
                size: self.bytes.len(),
            });
        }
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Combinational slave outputs for the current cycle.
    pub fn slave_out(&self) -> BurstSlaveOut {
        let mut out = BurstSlaveOut::default();
        match self.state {
            State::Idle => {
                out.awready = true;
                out.arready = true;
            }
            State::Read { addr, beat, beats } => {
                out.rvalid = true;
                out.rdata = self.read_u32(addr + (beat as u32) * 4);
                out.rlast = beat + 1 == beats;
            }
            State::Write { .. } => out.wready = true,
            State::WriteResp => out.bvalid = true,
        }
        out
    }

    /// Advances the slave state machine by one cycle.
    ///
    /// `m` carries the master-side signals for the same cycle, computed from
    /// the master's registered state.
    pub fn tick(&mut self, m: &BurstMasterOut) {
        match self.state {
            State::Idle => {
                // Write address wins when both are pending; masters here
                // never drive both channels in the same cycle.
                if m.awvalid {
                    trace!(addr = m.awaddr, len = m.awlen, "burst write accepted");
                    self.state = State::Write {
                        addr: m.awaddr,
                        beat: 0,
                        beats: m.awlen as usize + 1,
                    };
                } else if m.arvalid {
                    trace!(addr = m.araddr, len = m.arlen, "burst read accepted");
                    self.state = State::Read {
                        addr: m.araddr,
                        beat: 0,
                        beats: m.arlen as usize + 1,
                    };
                }
            }
            State::Write { addr, beat, beats } => {
                if m.wvalid {
                    self.write_u32(addr + (beat as u32) * 4, m.wdata);
                    if m.wlast || beat + 1 == beats {
                        self.state = State::WriteResp;
                    } else {
                        self.state = State::Write {
                            addr,
                            beat: beat + 1,
                            beats,
                        };
                    }
                }
            }
            State::WriteResp => {
                if m.bready {
                    self.state = State::Idle;
                }
            }
            State::Read { addr, beat, beats } => {
                if m.rready {
                    if beat + 1 == beats {
                        self.state = State::Idle;
                    } else {
                        self.state = State::Read {
                            addr,
                            beat: beat + 1,
                            beats,
                        };
                    }
                }
            }
        }
    }
}
