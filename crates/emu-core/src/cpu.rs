//! CPU core trait.

use crate::Bus;

/// A CPU core, as seen by a board.
///
/// The instruction set itself lives outside the boards: a board only needs
/// to step a processor through its own bus and drive its interrupt pins.
/// The bus is passed in, not owned, so one board can hand the same
/// hardware to several processors through different address decoders.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Execute one instruction (or accept a pending interrupt) against
    /// `bus`, returning the number of CPU cycles it took.
    ///
    /// Boards schedule in whole instructions: a bus side effect that
    /// suspends the CPU takes hold once the current instruction completes.
    fn step<B: Bus>(&mut self, bus: &mut B) -> u32;

    /// Returns the current program counter.
    fn pc(&self) -> u32;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Offer a maskable interrupt. Returns true if the CPU accepted it
    /// (the acknowledge cycle ran).
    fn interrupt(&mut self) -> bool;

    /// Pulse the non-maskable interrupt input.
    fn nmi(&mut self);

    /// Reset the CPU to its initial state.
    fn reset(&mut self);
}
