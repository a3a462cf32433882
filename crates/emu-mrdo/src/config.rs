//! Board revisions and machine configuration.

use emu_core::{ClockPhase, MasterClock, Ticks};
use mmi_pal16r6::{MRDO_U001, ProtectionConfig, ProtectionError};
use thiserror::Error;

use crate::screen::{LINES_PER_FRAME, PIXELS_PER_LINE};

/// What is fitted behind the protection read port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardRevision {
    /// mrdo, mrdoy, mrdobl, yankeedo. The PAL's equations for these sets
    /// are unknown; the read port returns the ROM byte at HL, which is the
    /// value the check expects.
    Universal,
    /// mrdot, mrdofix, mrdu, mrdofabr: PAL16R6 with recovered equations.
    Taito,
    /// mrlo: no PAL and nothing on the read port.
    NoProtection,
}

impl BoardRevision {
    /// Protection wiring for this revision.
    #[must_use]
    pub const fn protection(self) -> ProtectionConfig {
        match self {
            Self::Universal => ProtectionConfig::bypassed(),
            Self::Taito => ProtectionConfig::fitted(MRDO_U001),
            Self::NoProtection => ProtectionConfig::absent(),
        }
    }
}

/// Crystal pair fitted to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crystals {
    /// 8.2 MHz main, 19.6 MHz video, as listed in the PCB manual.
    #[default]
    Standard,
    /// 8 MHz main, 19.908 MHz video, found on some bootlegs.
    Bootleg,
}

impl Crystals {
    /// Z80 clock: main crystal divided by 2.
    #[must_use]
    pub const fn cpu_clock(self) -> MasterClock {
        match self {
            Self::Standard => MasterClock::new(8_200_000).divided(2),
            Self::Bootleg => MasterClock::new(8_000_000).divided(2),
        }
    }

    /// Pixel clock: video crystal divided by 4.
    #[must_use]
    pub const fn pixel_clock(self) -> MasterClock {
        match self {
            Self::Standard => MasterClock::new(19_600_000).divided(4),
            Self::Bootleg => MasterClock::new(19_908_000).divided(4),
        }
    }

    /// CPU cycles in one 312 x 262 video frame.
    #[must_use]
    pub const fn cycles_per_frame(self) -> Ticks {
        ClockPhase::new(self.cpu_clock(), self.pixel_clock())
            .source_cycles(PIXELS_PER_LINE as u64 * LINES_PER_FRAME as u64)
    }
}

/// Program ROM occupies $0000-$7FFF.
pub const MAX_ROM_SIZE: usize = 0x8000;

/// Configuration for creating a [`crate::MrDo`] instance.
#[derive(Debug, Clone)]
pub struct MrDoConfig {
    pub revision: BoardRevision,
    pub crystals: Crystals,
    /// Program ROM, loaded at $0000.
    pub rom: Vec<u8>,
    /// Protection wiring; [`MrDoConfig::new`] takes it from the revision.
    pub protection: ProtectionConfig,
}

impl MrDoConfig {
    #[must_use]
    pub fn new(revision: BoardRevision, rom: Vec<u8>) -> Self {
        Self {
            revision,
            crystals: Crystals::default(),
            rom,
            protection: revision.protection(),
        }
    }

    /// Check the ROM fits the map. Protection wiring is checked when the
    /// PAL latch is built.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyRom`] or [`ConfigError::RomTooLarge`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rom.is_empty() {
            return Err(ConfigError::EmptyRom);
        }
        if self.rom.len() > MAX_ROM_SIZE {
            return Err(ConfigError::RomTooLarge {
                size: self.rom.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("program ROM is empty")]
    EmptyRom,
    #[error("program ROM is {size} bytes; $0000-$7FFF holds 32768")]
    RomTooLarge { size: usize },
    #[error(transparent)]
    Protection(#[from] ProtectionError),
}
