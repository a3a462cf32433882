//! Board variant configuration.

use emu_core::Ticks;
use thiserror::Error;

/// Games on the Do's Castle hardware. They differ only in address decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DoCastleVariant {
    /// Mr. Do's Castle.
    DoCastle,
    /// Do! Run Run: moved main RAM, latch at $E000 on the sub CPU.
    DoRunRun,
    /// Indoor Soccer: extra ROM, ADPCM control port.
    IdSoccer,
}

/// Main CPU cycles the main CPU waits for the sub CPU's commit before
/// giving up and running on.
///
/// The board's WAIT line has no timeout. A timeout keeps a sub CPU that
/// never answers from freezing the machine.
pub const DEFAULT_LATCH_TIMEOUT: Ticks = Ticks::new(500);

/// Largest program ROM either CPU can address.
pub const MAX_ROM_SIZE: usize = 0x1_0000;

/// Configuration for creating a [`crate::DoCastle`] instance.
#[derive(Debug, Clone)]
pub struct DoCastleConfig {
    pub variant: DoCastleVariant,
    /// Main CPU program, loaded at $0000.
    pub main_rom: Vec<u8>,
    /// Sub CPU program, loaded at $0000.
    pub sub_rom: Vec<u8>,
    pub latch_timeout: Ticks,
}

impl DoCastleConfig {
    /// Config with the default latch timeout.
    #[must_use]
    pub fn new(variant: DoCastleVariant, main_rom: Vec<u8>, sub_rom: Vec<u8>) -> Self {
        Self {
            variant,
            main_rom,
            sub_rom,
            latch_timeout: DEFAULT_LATCH_TIMEOUT,
        }
    }

    /// Check the config can build a machine.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty or oversized ROM, or a zero
    /// latch timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (cpu, rom) in [("main", &self.main_rom), ("sub", &self.sub_rom)] {
            if rom.is_empty() {
                return Err(ConfigError::EmptyRom { cpu });
            }
            if rom.len() > MAX_ROM_SIZE {
                return Err(ConfigError::RomTooLarge {
                    cpu,
                    size: rom.len(),
                });
            }
        }
        if self.latch_timeout == Ticks::ZERO {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{cpu} CPU ROM is empty")]
    EmptyRom { cpu: &'static str },
    #[error("{cpu} CPU ROM is {size} bytes; the address space holds 65536")]
    RomTooLarge { cpu: &'static str, size: usize },
    #[error("latch timeout must be at least one cycle")]
    ZeroTimeout,
}
