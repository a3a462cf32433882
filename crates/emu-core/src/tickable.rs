//! Trait for devices advanced by their own clock.

use crate::Ticks;

/// A device advanced one cycle of its own clock at a time.
///
/// Video timing chips implement this; boards convert CPU time into device
/// cycles with a [`ClockPhase`](crate::ClockPhase) and tick the device that
/// many times.
pub trait Tickable {
    /// Advance the device by one of its clock cycles.
    fn tick(&mut self);

    /// Advance by multiple cycles. Overrides must match repeated `tick()`.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
