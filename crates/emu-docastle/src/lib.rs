//! Universal's Do's Castle arcade board.
//!
//! Two Z80s cooperate through a 9-byte latch in each direction. The main
//! CPU runs the game and drives the 6845; the sub CPU reads the inputs and
//! plays sound. A third Z80 that forwards sprite data is not modelled: the
//! main CPU writes sprite RAM directly.
//!
//! The sub CPU has no timer. Its IRQ comes from MA6 of the 6845 sampled on
//! HSYNC ([`RasterEdgeDetector`]); the main CPU's IRQ follows VSYNC.
//!
//! The board is generic over the CPU core: anything implementing
//! [`emu_core::Cpu`] can be plugged in.

mod adpcm;
mod bus;
mod config;
mod docastle;
pub mod inputs;
mod latch;
mod map;
mod raster;

pub use adpcm::AdpcmControl;
pub use bus::SOUND_CHIPS;
pub use config::{ConfigError, DEFAULT_LATCH_TIMEOUT, DoCastleConfig, DoCastleVariant, MAX_ROM_SIZE};
pub use docastle::{
    BoardSnapshot, CHARACTER_CLOCK, CPU_CLOCK, CYCLES_PER_FRAME, DoCastle, LATCH_TRIGGER,
    VIDEO_CLOCK,
};
pub use inputs::InputMux;
pub use latch::{COMMIT_OFFSET, LATCH_SIZE, LatchBridge, LatchEvent};
pub use raster::RasterEdgeDetector;
