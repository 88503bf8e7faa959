//! Time Abstraction
//!
//! Injectable wall-clock source. Schedule math (`next_fire_after`, drift
//! correction) is written against [`Clock`] so tests can pin time without
//! sleeping.

use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Wall-clock time source.
pub trait Clock: Send + Sync {
    /// Get current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Get current Unix timestamp in seconds.
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// System clock backed by the actual wall clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually-advanced clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: chrono::Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += delta;
    }

    /// Pin the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(start);

        assert_eq!(clock.now(), start);
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
