//! Rate measurement for the graphics and haptics loops.
//!
//! A [`FrequencyCounter`] is signalled once per loop iteration and reports
//! how many iterations per second it saw over the last measurement period.
//!
//! # Example
//!
//! ```ignore
//! use haptic_effects::frequency::FrequencyCounter;
//!
//! let mut counter = FrequencyCounter::new();
//!
//! // In your loop:
//! counter.signal(1);
//!
//! println!("Rate: {:.0} Hz", counter.frequency());
//! ```

use std::time::{Duration, Instant};

/// Counts loop iterations and converts them into a rate in Hz.
#[derive(Debug, Clone)]
pub struct FrequencyCounter {
    /// Start of the current measurement period.
    period_start: Instant,
    /// Events counted in the current period.
    count: u64,
    /// Total events since creation.
    total: u64,
    /// Rate measured over the last complete period.
    frequency: f64,
    /// Length of a measurement period.
    period: Duration,
}

impl FrequencyCounter {
    /// Create a counter with a 0.5 s measurement period.
    pub fn new() -> Self {
        Self::with_period(Duration::from_millis(500))
    }

    /// Create a counter with a custom measurement period.
    pub fn with_period(period: Duration) -> Self {
        Self::starting_at(Instant::now(), period)
    }

    /// Create a counter whose first period starts at `start`.
    pub fn starting_at(start: Instant, period: Duration) -> Self {
        Self {
            period_start: start,
            count: 0,
            total: 0,
            frequency: 0.0,
            period: period.max(Duration::from_millis(1)),
        }
    }

    /// Record `events` occurrences now.
    ///
    /// Returns the current frequency for convenience.
    pub fn signal(&mut self, events: u64) -> f64 {
        self.signal_at(events, Instant::now())
    }

    /// Record `events` occurrences at a given instant.
    pub fn signal_at(&mut self, events: u64, now: Instant) -> f64 {
        self.count += events;
        self.total += events;

        let elapsed = now.saturating_duration_since(self.period_start);
        if elapsed >= self.period {
            self.frequency = self.count as f64 / elapsed.as_secs_f64();
            self.count = 0;
            self.period_start = now;
        }

        self.frequency
    }

    /// Rate over the last complete measurement period, in Hz.
    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Total number of events signalled.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Reset the counter to its initial state.
    pub fn reset(&mut self) {
        self.period_start = Instant::now();
        self.count = 0;
        self.total = 0;
        self.frequency = 0.0;
    }
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_new() {
        let counter = FrequencyCounter::new();
        assert_eq!(counter.frequency(), 0.0);
        assert_eq!(counter.total(), 0);
    }

    #[test]
    fn test_frequency_updates_after_period() {
        let start = Instant::now();
        let mut counter = FrequencyCounter::starting_at(start, Duration::from_millis(500));

        // Half a period: no measurement yet
        for i in 0..250 {
            counter.signal_at(1, start + Duration::from_millis(i));
        }
        assert_eq!(counter.frequency(), 0.0);

        // 500 events over exactly half a second => 1000 Hz
        for i in 250..500 {
            counter.signal_at(1, start + Duration::from_millis(i));
        }
        let hz = counter.signal_at(0, start + Duration::from_millis(500));
        assert!((hz - 1000.0).abs() < 1e-9);
        assert_eq!(counter.total(), 500);
    }

    #[test]
    fn test_frequency_holds_between_periods() {
        let start = Instant::now();
        let mut counter = FrequencyCounter::starting_at(start, Duration::from_secs(1));
        counter.signal_at(60, start + Duration::from_secs(1));
        assert!((counter.frequency() - 60.0).abs() < 1e-9);

        // Mid-period signals keep reporting the last measurement
        counter.signal_at(10, start + Duration::from_millis(1200));
        assert!((counter.frequency() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let start = Instant::now();
        let mut counter = FrequencyCounter::starting_at(start, Duration::from_millis(10));
        counter.signal_at(5, start + Duration::from_millis(10));
        counter.reset();
        assert_eq!(counter.frequency(), 0.0);
        assert_eq!(counter.total(), 0);
    }
}
