//! Crystal frequencies and cross-clock conversion.

use crate::Ticks;

/// Crystal frequency driving one part of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Frequency in Hz (e.g. `4_000_000` for the Do's Castle Z80s).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// The same crystal divided down by `divisor`.
    #[must_use]
    pub const fn divided(self, divisor: u64) -> Self {
        Self::new(self.frequency_hz / divisor)
    }
}

/// Converts elapsed cycles of a source clock into whole cycles of a
/// target clock, carrying the remainder so no time is lost.
///
/// Boards use this where a video chip runs from a different crystal to
/// the CPUs (9.828 MHz video against a 4 MHz CPU on Do's Castle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockPhase {
    source_hz: u64,
    target_hz: u64,
    /// Accumulated remainder, in units of `1 / source_hz` target cycles.
    phase: u64,
}

impl ClockPhase {
    #[must_use]
    pub const fn new(source: MasterClock, target: MasterClock) -> Self {
        Self {
            source_hz: source.frequency_hz,
            target_hz: target.frequency_hz,
            phase: 0,
        }
    }

    /// Advance by `elapsed` source cycles, returning how many target
    /// cycles completed.
    pub fn advance(&mut self, elapsed: Ticks) -> u64 {
        self.phase += elapsed.get() * self.target_hz;
        let whole = self.phase / self.source_hz;
        self.phase %= self.source_hz;
        whole
    }

    /// Source cycles needed to cover `target_cycles` target cycles,
    /// ignoring any carried phase (rounded down).
    #[must_use]
    pub const fn source_cycles(&self, target_cycles: u64) -> Ticks {
        Ticks::new(target_cycles * self.source_hz / self.target_hz)
    }

    pub fn reset(&mut self) {
        self.phase = 0;
    }
}
