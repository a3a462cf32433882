//! TMS1025 input multiplexers and the flip-screen latch.
//!
//! Two TMS1025s (low and high nibble) present one of seven input ports on
//! the sub CPU's data bus. The port is selected by the address of the
//! *previous* read: an access to `$C000 + n` returns the port selected
//! last time and then latches `n & 7` as the next select. An LS273 on the
//! same decode latches address bit 7 as flip-screen.
//!
//! Each port is modelled as a whole byte. On the board the two chips
//! select independently, each driving its own nibble, but the sub CPU
//! always addresses them together so the halves never disagree.

/// Port numbers as wired on the Do's Castle board.
pub const PORT_DSW2: usize = 1;
pub const PORT_DSW1: usize = 2;
pub const PORT_JOYS: usize = 3;
/// Indoor Soccer only.
pub const PORT_JOYS_RIGHT: usize = 4;
pub const PORT_BUTTONS: usize = 5;
pub const PORT_SYSTEM: usize = 7;

/// Number of selectable ports (select 0 is not connected).
pub const PORT_COUNT: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputMux {
    /// Active-low port values; 0xFF is nothing pressed.
    ports: [u8; PORT_COUNT],
    select: u8,
    flip_screen: bool,
}

impl Default for InputMux {
    fn default() -> Self {
        Self::new()
    }
}

impl InputMux {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ports: [0xFF; PORT_COUNT],
            select: 0,
            flip_screen: false,
        }
    }

    /// Set the value an input port presents. Out-of-range ports are ignored.
    pub fn set_port(&mut self, port: usize, value: u8) {
        if let Some(slot) = self.ports.get_mut(port) {
            *slot = value;
        }
    }

    /// CPU read at `offset` within the decode window (bits 0-2 and 7).
    pub fn read(&mut self, offset: u16) -> u8 {
        let value = self.ports[usize::from(self.select)];
        self.latch_address(offset);
        self.select = (offset & 7) as u8;
        value
    }

    /// CPU write: only the address matters.
    pub fn write(&mut self, offset: u16) {
        self.latch_address(offset);
    }

    #[must_use]
    pub fn select(&self) -> u8 {
        self.select
    }

    #[must_use]
    pub fn flip_screen(&self) -> bool {
        self.flip_screen
    }

    /// Clear select and flip; port values are inputs and survive reset.
    pub fn reset(&mut self) {
        self.select = 0;
        self.flip_screen = false;
    }

    fn latch_address(&mut self, offset: u16) {
        self.flip_screen = offset & 0x80 != 0;
    }
}
