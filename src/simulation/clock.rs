//! Time accumulator for the fixed-step loop.

use crate::config::TICK_INTERVAL_MS;

/// Unconsumed wall time plus the monotonic tick counter.
///
/// After every drain the accumulator is in `[0, tick_interval_ms)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    accumulator_ms: f64,
    tick_count: u64,
    tick_interval_ms: f64,
}

impl SimulationClock {
    pub fn new(tick_interval_ms: f64) -> Self {
        Self {
            accumulator_ms: 0.0,
            tick_count: 0,
            tick_interval_ms,
        }
    }

    pub fn tick_interval_ms(&self) -> f64 {
        self.tick_interval_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn accumulator_ms(&self) -> f64 {
        self.accumulator_ms
    }

    /// Add elapsed wall time. Negative and NaN deltas count as zero.
    pub fn accumulate(&mut self, delta_ms: f64) {
        self.accumulator_ms += delta_ms.max(0.0);
    }

    /// Consume one tick worth of time if available. A clock without a
    /// positive interval never ticks.
    pub fn consume_tick(&mut self) -> bool {
        if self.tick_interval_ms > 0.0 && self.accumulator_ms >= self.tick_interval_ms {
            self.accumulator_ms -= self.tick_interval_ms;
            self.tick_count += 1;
            true
        } else {
            false
        }
    }

    /// Discard whole ticks still pending, keeping the sub-tick remainder.
    /// Returns the discarded time in milliseconds.
    pub fn drop_backlog(&mut self) -> f64 {
        if self.tick_interval_ms <= 0.0 || self.accumulator_ms < self.tick_interval_ms {
            return 0.0;
        }
        let remainder = self.accumulator_ms % self.tick_interval_ms;
        let dropped = self.accumulator_ms - remainder;
        self.accumulator_ms = remainder;
        dropped
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(TICK_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_requires_a_full_interval() {
        let mut clock = SimulationClock::new(10.0);
        clock.accumulate(9.5);
        assert!(!clock.consume_tick());
        clock.accumulate(0.5);
        assert!(clock.consume_tick());
        assert_eq!(clock.tick_count(), 1);
        assert!(clock.accumulator_ms().abs() < 1e-9);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut clock = SimulationClock::new(10.0);
        clock.accumulate(-50.0);
        clock.accumulate(f64::NAN);
        assert_eq!(clock.accumulator_ms(), 0.0);
    }

    #[test]
    fn drop_backlog_keeps_remainder() {
        let mut clock = SimulationClock::new(10.0);
        clock.accumulate(47.0);
        let dropped = clock.drop_backlog();
        assert!((dropped - 40.0).abs() < 1e-9);
        assert!((clock.accumulator_ms() - 7.0).abs() < 1e-9);
        assert_eq!(clock.tick_count(), 0);
    }

    #[test]
    fn zero_interval_never_ticks() {
        let mut clock = SimulationClock::new(0.0);
        clock.accumulate(100.0);
        assert!(!clock.consume_tick());
        assert_eq!(clock.drop_backlog(), 0.0);
        assert_eq!(clock.tick_count(), 0);
    }
}
