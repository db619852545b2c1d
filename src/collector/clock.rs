//! Time sources for message timestamps.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

/// Source of capture timestamps.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic capture.
///
/// Returns the same instant until it is moved with [`set`](Self::set) or
/// [`advance`](Self::advance).
#[derive(Debug)]
pub struct ManualClock {
    current: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Cell::new(start),
        }
    }

    /// Clock positioned `secs` seconds after the Unix epoch.
    pub fn at_seconds(secs: i64) -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs))
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.current.set(instant);
    }

    /// Jump to `secs` seconds after the Unix epoch.
    pub fn set_seconds(&self, secs: i64) {
        self.set(DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs));
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.current.get()
    }
}
