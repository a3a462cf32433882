//! Sub CPU interrupt from the CRTC address counter.
//!
//! The board has no timer for the sub CPU. Its IRQ is clocked from MA6 of
//! the 6845, sampled on each HSYNC: a rising edge of MA6 raises the IRQ.

/// Edge detector on one bit of the CRTC memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterEdgeDetector {
    bit: u8,
    previous: bool,
}

impl Default for RasterEdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterEdgeDetector {
    /// Detector on MA6, as wired on the Do's Castle board.
    #[must_use]
    pub const fn new() -> Self {
        Self::on_bit(6)
    }

    #[must_use]
    pub const fn on_bit(bit: u8) -> Self {
        Self {
            bit,
            previous: false,
        }
    }

    /// Sample the address at an HSYNC. Returns true on a 0 to 1 transition.
    pub fn on_horizontal_sync(&mut self, ma: u16) -> bool {
        let level = (ma >> self.bit) & 1 != 0;
        let rising = level && !self.previous;
        self.previous = level;
        rising
    }

    /// Level seen at the last sample.
    #[must_use]
    pub const fn level(&self) -> bool {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = false;
    }
}
