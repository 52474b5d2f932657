//! Time and timestamp helpers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_changed`, `last_updated`, throttle windows, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Source of the current time.
///
/// Components that compare timestamps (throttles, staleness checks) take a
/// `Clock` so tests can drive time explicitly.
pub trait Clock: Send + Sync {
    /// The current UTC time according to this clock.
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_read_system_clock_through_arc() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let before = Utc::now();
        let ts = clock.now();
        assert!(ts >= before);
    }
}
