//! The 9-byte mailbox between the main and sub CPUs.
//!
//! Each CPU has an outbound buffer the other reads. Byte 8 is the commit
//! byte: the real board asserts the main CPU's WAIT line when it writes it
//! and releases WAIT when the sub CPU writes its own byte 8. The latch
//! itself only stores; it reports commits as [`LatchEvent`]s and the
//! machine turns them into a suspend (main side) or a resume (sub side).

use emu_core::OPEN_BUS;
use log::{debug, trace};

/// Bytes in each direction.
pub const LATCH_SIZE: usize = 9;

/// Offset whose write completes a message.
pub const COMMIT_OFFSET: usize = LATCH_SIZE - 1;

/// What a latch write means to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchEvent {
    /// Payload byte, no synchronisation effect.
    Stored,
    /// Byte 8 written: the message is complete.
    Commit,
}

/// Both directions of the shared latch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatchBridge {
    /// Written by the main CPU, read by the sub CPU.
    to_sub: [u8; LATCH_SIZE],
    /// Written by the sub CPU, read by the main CPU.
    to_main: [u8; LATCH_SIZE],
}

impl LatchBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Main CPU read: a byte of the sub CPU's outbound message.
    #[must_use]
    pub fn read_main(&self, offset: usize) -> u8 {
        Self::peek(&self.to_main, offset, "main")
    }

    /// Sub CPU read: a byte of the main CPU's outbound message.
    #[must_use]
    pub fn read_sub(&self, offset: usize) -> u8 {
        Self::peek(&self.to_sub, offset, "sub")
    }

    /// Main CPU write into its outbound buffer.
    pub fn write_main(&mut self, offset: usize, data: u8) -> LatchEvent {
        Self::store(&mut self.to_sub, offset, data, "main")
    }

    /// Sub CPU write into its outbound buffer.
    pub fn write_sub(&mut self, offset: usize, data: u8) -> LatchEvent {
        Self::store(&mut self.to_main, offset, data, "sub")
    }

    /// Main CPU's outbound buffer.
    #[must_use]
    pub fn to_sub(&self) -> &[u8; LATCH_SIZE] {
        &self.to_sub
    }

    /// Sub CPU's outbound buffer.
    #[must_use]
    pub fn to_main(&self) -> &[u8; LATCH_SIZE] {
        &self.to_main
    }

    pub fn reset(&mut self) {
        self.to_sub = [0; LATCH_SIZE];
        self.to_main = [0; LATCH_SIZE];
    }

    fn peek(buffer: &[u8; LATCH_SIZE], offset: usize, side: &str) -> u8 {
        match buffer.get(offset) {
            Some(&byte) => byte,
            None => {
                debug!("latch: {side} CPU read of unmapped offset {offset}");
                OPEN_BUS
            }
        }
    }

    fn store(buffer: &mut [u8; LATCH_SIZE], offset: usize, data: u8, side: &str) -> LatchEvent {
        let Some(slot) = buffer.get_mut(offset) else {
            debug!("latch: {side} CPU write {data:#04X} to unmapped offset {offset}");
            return LatchEvent::Stored;
        };
        *slot = data;
        if offset == COMMIT_OFFSET {
            trace!("latch: {side} CPU commits {buffer:02X?}");
            LatchEvent::Commit
        } else {
            LatchEvent::Stored
        }
    }
}
