//! Core traits and types shared by the arcade boards.
//!
//! Every board runs its processors on one cooperative timeline. Time is
//! counted in CPU cycles of the board's main clock; devices on other
//! crystals are advanced through a [`ClockPhase`] accumulator so the
//! whole machine stays deterministic.

mod bus;
mod clock;
mod cpu;
mod line;
mod observable;
mod scheduler;
mod tickable;
mod ticks;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bus::{Bus, OPEN_BUS};
pub use clock::{ClockPhase, MasterClock};
pub use cpu::Cpu;
pub use line::{InputLine, LineState};
pub use observable::{Observable, Value};
pub use scheduler::{Resume, Scheduler, Slice, TaskId, TriggerId};
pub use tickable::Tickable;
pub use ticks::Ticks;
