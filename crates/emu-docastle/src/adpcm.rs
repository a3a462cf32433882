//! Indoor Soccer ADPCM control port at $C000.
//!
//! Only the control side is modelled: where playback starts, whether the
//! MSM5205 is held in reset, and the status bit the game polls. Sample
//! decoding is left to a sound back end.

/// Sample ROM bytes per start-position step.
pub const BLOCK_SIZE: usize = 0x200;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdpcmControl {
    position: usize,
    idle: bool,
    status: u8,
}

impl AdpcmControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status read. Bit 7 toggles on every read; the game only waits for
    /// it to change.
    pub fn read_status(&mut self) -> u8 {
        self.status ^= 0x80;
        self.status
    }

    /// Bit 7 set stops playback; otherwise bits 0-6 pick a start block.
    pub fn write(&mut self, data: u8) {
        if data & 0x80 != 0 {
            self.idle = true;
        } else {
            self.position = usize::from(data & 0x7F) * BLOCK_SIZE;
            self.idle = false;
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
