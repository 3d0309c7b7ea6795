//! Time sources feeding the tick loop.

use std::{fmt::Debug, time::Instant};

use lanecraft_core::Millis;

/// Measures the time that passed between two ticks.
pub trait Clock: Debug + Send {
    /// Restarts the measurement from now.
    fn reset(&mut self);

    /// Milliseconds since the previous lap or reset, never negative.
    fn lap(&mut self) -> Millis;
}

/// Wall-clock time source.
#[derive(Debug)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    /// Creates a clock measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn reset(&mut self) {
        self.last = Instant::now();
    }

    fn lap(&mut self) -> Millis {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f64() * 1000.0
    }
}

/// Clock that reports a fixed step on every lap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManualClock {
    step: Millis,
}

impl ManualClock {
    /// Creates a clock advancing by `step` milliseconds per lap.
    #[must_use]
    pub fn new(step: Millis) -> Self {
        Self {
            step: step.max(0.0),
        }
    }

    /// Changes the step reported by later laps.
    pub fn set_step(&mut self, step: Millis) {
        self.step = step.max(0.0);
    }
}

impl Clock for ManualClock {
    fn reset(&mut self) {}

    fn lap(&mut self) -> Millis {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, SystemClock};

    #[test]
    fn manual_clock_repeats_its_step() {
        let mut clock = ManualClock::new(50.0);
        assert_eq!(clock.lap(), 50.0);
        clock.set_step(-5.0);
        assert_eq!(clock.lap(), 0.0);
    }

    #[test]
    fn system_clock_laps_are_non_negative() {
        let mut clock = SystemClock::new();
        clock.reset();
        assert!(clock.lap() >= 0.0);
        assert!(clock.lap() >= 0.0);
    }
}
