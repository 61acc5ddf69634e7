//! Logical tick clock.
//!
//! All timing in Furrow is expressed in discrete host ticks; there is no
//! wall-clock time in the core. The tick counter only moves forward, one
//! step per host update, and every derived deadline uses checked arithmetic.

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic logical clock counting host ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickClock {
    tick: u64,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an explicit tick (useful for tests).
    pub const fn at(tick: u64) -> Self {
        Self { tick }
    }

    /// The current tick.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance by one tick and return the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter is at `u64::MAX`.
    pub const fn advance(&mut self) -> Result<u64, ClockError> {
        match self.tick.checked_add(1) {
            Some(next) => {
                self.tick = next;
                Ok(next)
            }
            None => Err(ClockError::TickOverflow),
        }
    }

    /// The tick at which something delayed by `delay` ticks becomes due.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the deadline is not
    /// representable.
    pub const fn deadline(&self, delay: u64) -> Result<u64, ClockError> {
        match self.tick.checked_add(delay) {
            Some(due) => Ok(due),
            None => Err(ClockError::TickOverflow),
        }
    }
}
