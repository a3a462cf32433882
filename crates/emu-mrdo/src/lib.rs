//! Universal's Mr. Do! arcade board.
//!
//! One Z80 at 4.1 MHz, two tile layers, sprites and two SN76489s. The
//! interesting part is the protection: every write to the tile RAM at
//! $8000-$8FFF also clocks a PAL16R6 (U001), and the program reads the
//! PAL's registered outputs back from $9803 to check the board is genuine.
//!
//! Board revisions differ only in what sits behind $9803 (see
//! [`BoardRevision`]). The CPU's only interrupt is VBLANK.

mod bus;
mod config;
mod cpu;
mod map;
mod mrdo;
mod screen;

pub use config::{BoardRevision, ConfigError, Crystals, MAX_ROM_SIZE, MrDoConfig};
pub use cpu::MainCpu;
pub use mrdo::{BoardSnapshot, InputPort, Layer, MrDo};
pub use screen::{
    LINES_PER_FRAME, PIXELS_PER_LINE, ScreenTiming, VBLANK_END_LINE, VBLANK_START_LINE,
    VblankEdge,
};
