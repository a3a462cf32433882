//! Interrupt input lines.

use crate::Cpu;

/// Drive state of an interrupt input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineState {
    /// Not asserted.
    #[default]
    Clear,
    /// Asserted until the board clears it.
    Assert,
    /// Asserted until the CPU acknowledges it, then cleared automatically.
    Hold,
}

/// One interrupt input of a CPU, owned by the board that drives it.
///
/// Boards raise the line from device callbacks and offer it to the CPU
/// before each instruction with [`InputLine::deliver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputLine {
    state: LineState,
}

impl InputLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LineState::Clear,
        }
    }

    pub fn assert(&mut self) {
        self.state = LineState::Assert;
    }

    pub fn hold(&mut self) {
        self.state = LineState::Hold;
    }

    pub fn clear(&mut self) {
        self.state = LineState::Clear;
    }

    #[must_use]
    pub const fn state(&self) -> LineState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, LineState::Clear)
    }

    /// Offer the line to `cpu` as a maskable interrupt.
    ///
    /// Returns true if the CPU acknowledged it. A held line clears on
    /// acknowledge; an asserted line stays up for the board to clear.
    pub fn deliver<C: Cpu>(&mut self, cpu: &mut C) -> bool {
        if !self.is_active() {
            return false;
        }
        let accepted = cpu.interrupt();
        if accepted && self.state == LineState::Hold {
            self.state = LineState::Clear;
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedCpu;

    #[test]
    fn clear_line_is_not_offered() {
        let mut cpu = ScriptedCpu::new(Vec::new());
        let mut line = InputLine::new();
        assert!(!line.deliver(&mut cpu));
        assert_eq!(cpu.interrupts_taken(), 0);
    }

    #[test]
    fn held_line_clears_on_acknowledge() {
        let mut cpu = ScriptedCpu::new(Vec::new());
        let mut line = InputLine::new();
        line.hold();
        assert!(line.deliver(&mut cpu));
        assert_eq!(line.state(), LineState::Clear);
        assert_eq!(cpu.interrupts_taken(), 1);
    }

    #[test]
    fn held_line_survives_masked_cpu() {
        let mut cpu = ScriptedCpu::new(Vec::new());
        cpu.set_interrupts_enabled(false);
        let mut line = InputLine::new();
        line.hold();
        assert!(!line.deliver(&mut cpu));
        assert_eq!(line.state(), LineState::Hold);
    }

    #[test]
    fn asserted_line_stays_up() {
        let mut cpu = ScriptedCpu::new(Vec::new());
        let mut line = InputLine::new();
        line.assert();
        assert!(line.deliver(&mut cpu));
        assert!(line.is_active());
    }
}
