//! The registered output latch and how a board reads it.

use emu_core::{OPEN_BUS, Observable, Value};
use log::{debug, trace};
use thiserror::Error;

use crate::EquationTable;

/// Latch contents at power-on: every registered output high.
pub const POWER_ON_OUTPUT: u8 = 0xFF;

/// How a board wires (or does not wire) its protection PAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtectionConfig {
    /// The PAL is fitted and its outputs drive the read port.
    pub enabled: bool,
    /// With the PAL absent, the read port returns the program ROM byte
    /// addressed by HL, which is what the check compares against.
    pub bypass: bool,
    /// Equations of the fitted part.
    pub equations: Option<EquationTable>,
}

impl ProtectionConfig {
    /// A fitted PAL running `equations`.
    #[must_use]
    pub const fn fitted(equations: EquationTable) -> Self {
        Self {
            enabled: true,
            bypass: false,
            equations: Some(equations),
        }
    }

    /// No PAL; the read port mirrors `ROM[HL]`.
    #[must_use]
    pub const fn bypassed() -> Self {
        Self {
            enabled: false,
            bypass: true,
            equations: None,
        }
    }

    /// No PAL and nothing on the read port.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            enabled: false,
            bypass: false,
            equations: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtectionError {
    #[error("protection PAL enabled without an equation table")]
    MissingEquations,
}

/// The PAL's registered outputs as seen from the CPU.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtectionLatch {
    output: u8,
    config: ProtectionConfig,
}

impl ProtectionLatch {
    /// Build the latch for a board.
    ///
    /// # Errors
    ///
    /// [`ProtectionError::MissingEquations`] if the PAL is enabled but no
    /// equations were given.
    pub fn new(config: ProtectionConfig) -> Result<Self, ProtectionError> {
        if config.enabled && config.equations.is_none() {
            return Err(ProtectionError::MissingEquations);
        }
        Ok(Self {
            output: POWER_ON_OUTPUT,
            config,
        })
    }

    /// Clock a data-bus byte into the PAL.
    ///
    /// Called on every CPU write the PAL's clock pin sees. Does nothing
    /// when the PAL is not fitted.
    pub fn clock(&mut self, data: u8) {
        if !self.config.enabled {
            return;
        }
        if let Some(equations) = &self.config.equations {
            self.output = !equations.evaluate(data);
            trace!("PAL clocked {data:#04X}, output {:#04X}", self.output);
        }
    }

    /// Value on the protection read port.
    ///
    /// `rom` is the main program ROM and `hl` the CPU's HL pair at the time
    /// of the read; they only matter for bypassed boards. Reads never
    /// change the latch.
    #[must_use]
    pub fn read(&self, rom: &[u8], hl: u16) -> u8 {
        if self.config.enabled {
            return self.output;
        }
        if self.config.bypass {
            return match rom.get(usize::from(hl)) {
                Some(&byte) => byte,
                None => {
                    debug!("protection bypass read past ROM end at HL={hl:#06X}");
                    OPEN_BUS
                }
            };
        }
        OPEN_BUS
    }

    /// Raw latch contents, whether or not they reach the bus.
    #[must_use]
    pub const fn output(&self) -> u8 {
        self.output
    }

    #[must_use]
    pub const fn config(&self) -> &ProtectionConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.output = POWER_ON_OUTPUT;
    }
}

impl Observable for ProtectionLatch {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "output" => Some(self.output.into()),
            "enabled" => Some(self.config.enabled.into()),
            "bypass" => Some(self.config.bypass.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["output", "enabled", "bypass"]
    }
}
