//! Beam position and VBLANK.
//!
//! The board's sync chain counts 312 pixel clocks per line and 262 lines
//! per frame. Lines 32-223 are displayed; VBLANK runs from the start of
//! line 224 to the start of line 32 of the next frame.

use emu_core::Tickable;

pub const PIXELS_PER_LINE: u16 = 312;
pub const LINES_PER_FRAME: u16 = 262;
/// First line of VBLANK.
pub const VBLANK_START_LINE: u16 = 224;
/// First displayed line; VBLANK ends here.
pub const VBLANK_END_LINE: u16 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VblankEdge {
    Start,
    End,
}

/// Horizontal and vertical counters, one tick per pixel clock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenTiming {
    pixel: u16,
    line: u16,
    frames: u64,
    edge: Option<VblankEdge>,
}

impl ScreenTiming {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pixel(&self) -> u16 {
        self.pixel
    }

    #[must_use]
    pub fn line(&self) -> u16 {
        self.line
    }

    /// Completed frames since reset.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn in_vblank(&self) -> bool {
        self.line >= VBLANK_START_LINE || self.line < VBLANK_END_LINE
    }

    /// VBLANK edge crossed by the last tick, if any.
    pub fn take_vblank_edge(&mut self) -> Option<VblankEdge> {
        self.edge.take()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Tickable for ScreenTiming {
    fn tick(&mut self) {
        self.pixel += 1;
        if self.pixel < PIXELS_PER_LINE {
            return;
        }
        self.pixel = 0;
        self.line += 1;
        if self.line == LINES_PER_FRAME {
            self.line = 0;
            self.frames += 1;
        }
        match self.line {
            VBLANK_START_LINE => self.edge = Some(VblankEdge::Start),
            VBLANK_END_LINE => self.edge = Some(VblankEdge::End),
            _ => {}
        }
    }
}
