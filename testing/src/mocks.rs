//! Mock implementations of environment traits.

use chrono::{DateTime, Duration, Utc};
use janseva_core::environment::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Fixed clock for deterministic tests.
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use janseva_testing::mocks::FixedClock;
/// use janseva_core::environment::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// let time1 = clock.now();
/// let time2 = clock.now();
/// assert_eq!(time1, time2); // Always the same!
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time.
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Create a default fixed clock for tests (2025-01-14 09:00:00 UTC).
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-14T09:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// Clock that advances by a fixed step on every `now()` call.
///
/// FIFO assertions need successive bookings to carry successive
/// `created_at` values; a [`FixedClock`] would make every booking a
/// clock collision (resolved by id tie-break, not booking order).
///
/// # Example
///
/// ```
/// use janseva_testing::mocks::stepping_clock;
/// use janseva_core::environment::Clock;
///
/// let clock = stepping_clock();
/// assert!(clock.now() < clock.now());
/// ```
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    step: Duration,
    ticks: AtomicI64,
}

impl SteppingClock {
    /// Create a stepping clock from a start instant and per-call step.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            step,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + self.step * i32::try_from(tick).unwrap_or(i32::MAX)
    }
}

/// A stepping clock starting at the [`test_clock`] instant, advancing
/// one second per `now()` call - far too slow to ever cross the test
/// day.
#[must_use]
pub fn stepping_clock() -> SteppingClock {
    SteppingClock::new(test_clock().now(), Duration::seconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_stable() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.today(), clock.now().date_naive());
    }
}
