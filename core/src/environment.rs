//! Injected dependencies shared by every engine operation.
//!
//! All external effects the engine needs beyond storage are abstracted
//! behind traits and injected, so tests can run against deterministic
//! implementations.

use chrono::{DateTime, NaiveDate, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// # Examples
///
/// ```
/// use janseva_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let today = clock.today();
/// assert_eq!(today, clock.now().date_naive());
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar day (UTC).
    ///
    /// "Today" decides which tokens are queue-eligible, so every caller
    /// must derive it from the same instant source.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
