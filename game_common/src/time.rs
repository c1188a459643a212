//! Simulation time.
//!
//! Timers in here do not read the wall clock. They are advanced explicitly by the fixed
//! simulation tick and polled against thresholds, so the simulation stays deterministic.

use std::time::Duration;

/// An elapsed-time counter advanced by simulation ticks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    elapsed: Duration,
}

impl Timer {
    pub const fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    #[inline]
    pub fn tick(&mut self, delta: Duration) {
        self.elapsed += delta;
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed.as_secs_f32() * 1000.0
    }

    /// Returns `true` if at least `ms` milliseconds have passed since the last reset.
    #[inline]
    pub fn is_past_ms(&self, ms: f32) -> bool {
        self.elapsed_ms() >= ms
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Timer;

    #[test]
    fn timer_tick_and_reset() {
        let mut timer = Timer::new();
        assert!(!timer.is_past_ms(1.0));

        for _ in 0..3 {
            timer.tick(Duration::from_millis(20));
        }
        assert!(timer.is_past_ms(60.0));
        assert!(!timer.is_past_ms(61.0));

        timer.reset();
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }
}
