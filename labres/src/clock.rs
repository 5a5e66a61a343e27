//! Time source used by planners and read-time status derivation.
//!
//! The engine never calls `Local::now()` directly. Tests inject a
//! [`FixedClock`] to make past/future checks and `completed` deterministic.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use chrono::{Duration, Local, NaiveDateTime};

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current local wall-clock time of the lab.
    fn now(&self) -> NaiveDateTime;

    /// Returns the timestamp recorded on created/updated rows.
    fn timestamp(&self) -> SystemTime {
        SystemTime::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }

    fn timestamp(&self) -> SystemTime {
        (**self).timestamp()
    }
}

/// The system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock for tests and simulations.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, NaiveDate};
/// use labres::{Clock, FixedClock};
///
/// let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
/// let clock = FixedClock::new(start);
/// clock.advance(Duration::hours(2));
/// assert_eq!(clock.now(), start + Duration::hours(2));
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub const fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timestamp(&self) -> SystemTime {
        self.now().and_utc().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_fixed_clock_set_and_advance() {
        let clock = FixedClock::new(start());
        assert_eq!(clock.now(), start());

        clock.advance(Duration::days(1));
        assert_eq!(clock.now(), start() + Duration::days(1));

        clock.set(start());
        assert_eq!(clock.now(), start());
    }

    #[test]
    fn test_fixed_clock_timestamp_is_deterministic() {
        let clock = FixedClock::new(start());
        assert_eq!(clock.timestamp(), clock.timestamp());
    }

    #[test]
    fn test_shared_clock() {
        let clock = Arc::new(FixedClock::new(start()));
        let shared: Box<dyn Clock> = Box::new(Arc::clone(&clock));
        clock.advance(Duration::minutes(30));
        assert_eq!(shared.now(), start() + Duration::minutes(30));
    }

    #[test]
    fn test_system_clock_moves() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
