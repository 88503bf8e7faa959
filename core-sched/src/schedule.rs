//! Schedule model and next-fire computation.
//!
//! Both schedule kinds reduce to pure functions over `DateTime<Utc>` so
//! the timing rules can be tested without timers. Cron expressions use
//! the standard 5-field form (minute hour day-of-month month day-of-week)
//! and are evaluated in UTC.

use chrono::{DateTime, Duration, Utc};
use std::str::FromStr;

use crate::error::{Result, ScheduleError};

/// Longest accepted interval: one year. Chrono durations are
/// millisecond-backed, so unbounded second counts would overflow.
pub const MAX_INTERVAL_SECONDS: u64 = 366 * 24 * 60 * 60;

/// When a job should fire.
#[derive(Debug, Clone)]
pub enum Schedule {
    /// Fixed cadence, anchored at the first fire.
    Interval(Duration),
    /// Standard 5-field cron expression.
    Cron(Box<cron::Schedule>),
}

impl Schedule {
    /// Build an interval schedule from whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::ZeroInterval`] for a zero interval and
    /// [`ScheduleError::IntervalTooLarge`] above
    /// [`MAX_INTERVAL_SECONDS`].
    pub fn interval(seconds: u64) -> Result<Self> {
        if seconds == 0 {
            return Err(ScheduleError::ZeroInterval);
        }
        if seconds > MAX_INTERVAL_SECONDS {
            return Err(ScheduleError::IntervalTooLarge {
                seconds,
                max: MAX_INTERVAL_SECONDS,
            });
        }
        Ok(Self::Interval(Duration::seconds(seconds as i64)))
    }

    /// Parse a 5-field cron expression.
    ///
    /// The `cron` crate expects a seconds field, so a literal `0` is
    /// prefixed: jobs fire at second zero of the matching minute.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not have exactly 5 fields
    /// or does not parse.
    pub fn cron(expression: &str) -> Result<Self> {
        let fields = expression.split_whitespace().count();
        if fields != 5 {
            return Err(ScheduleError::CronFieldCount {
                expression: expression.to_string(),
                fields,
            });
        }
        let with_seconds = format!("0 {}", expression.trim());
        let parsed =
            cron::Schedule::from_str(&with_seconds).map_err(|e| ScheduleError::InvalidCron {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::Cron(Box::new(parsed)))
    }

    /// The first fire after arming at `now`.
    ///
    /// Interval jobs fire immediately; cron jobs wait for the next
    /// matching instant. `None` means the schedule can never fire again.
    pub fn first_fire(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Interval(_) => Some(now),
            Self::Cron(schedule) => schedule.after(&now).next(),
        }
    }
}

/// Compute the next interval fire from the previous *scheduled* fire.
///
/// Returns `(fire_at, new_anchor)`. The anchor stays on the original
/// cadence grid: execution duration does not shift subsequent ticks.
/// When `anchor + interval` is already in the past the overdue tick
/// fires immediately, exactly once, and the anchor realigns to the last
/// grid point at or before `now` so multiple missed ticks never burst.
pub fn next_interval_fire(
    anchor: DateTime<Utc>,
    interval: Duration,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = anchor + interval;
    if next > now {
        return (next, next);
    }

    let mut aligned = next;
    while aligned + interval <= now {
        aligned = aligned + interval;
    }
    (now, aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn interval_rejects_zero() {
        assert!(matches!(
            Schedule::interval(0),
            Err(ScheduleError::ZeroInterval)
        ));
        assert!(Schedule::interval(3600).is_ok());
    }

    #[test]
    fn interval_rejects_oversized_values() {
        assert!(Schedule::interval(MAX_INTERVAL_SECONDS).is_ok());
        assert!(matches!(
            Schedule::interval(MAX_INTERVAL_SECONDS + 1),
            Err(ScheduleError::IntervalTooLarge { .. })
        ));
        // Counts that would overflow the millisecond backing must come
        // back as errors, not panic or wrap into a negative duration.
        assert!(matches!(
            Schedule::interval(5_000_000_000_000_000_000),
            Err(ScheduleError::IntervalTooLarge { .. })
        ));
        assert!(matches!(
            Schedule::interval(u64::MAX),
            Err(ScheduleError::IntervalTooLarge { .. })
        ));
    }

    #[test]
    fn interval_first_fire_is_immediate() {
        let schedule = Schedule::interval(3600).unwrap();
        assert_eq!(schedule.first_fire(at(0)), Some(at(0)));
    }

    #[test]
    fn cron_rejects_wrong_field_count() {
        assert!(matches!(
            Schedule::cron("0 4 * *"),
            Err(ScheduleError::CronFieldCount { fields: 4, .. })
        ));
        assert!(matches!(
            Schedule::cron("0 0 4 * * *"),
            Err(ScheduleError::CronFieldCount { fields: 6, .. })
        ));
    }

    #[test]
    fn cron_rejects_garbage() {
        assert!(matches!(
            Schedule::cron("61 4 * * *"),
            Err(ScheduleError::InvalidCron { .. })
        ));
    }

    #[test]
    fn cron_fires_daily_at_four() {
        let schedule = Schedule::cron("0 4 * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let fire = schedule.first_fire(now).unwrap();
        assert_eq!(fire, Utc.with_ymd_and_hms(2024, 5, 2, 4, 0, 0).unwrap());

        // Armed just before 04:00 fires the same day.
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 3, 59, 0).unwrap();
        let fire = schedule.first_fire(now).unwrap();
        assert_eq!(fire, Utc.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap());
    }

    #[test]
    fn interval_ticks_have_no_drift() {
        let interval = Duration::seconds(3600);
        // Run finished 40 minutes into the hour; next tick stays on the grid.
        let (fire, anchor) = next_interval_fire(at(0), interval, at(2400));
        assert_eq!(fire, at(3600));
        assert_eq!(anchor, at(3600));

        let (fire, anchor) = next_interval_fire(anchor, interval, at(3601));
        assert_eq!(fire, at(7200));
        assert_eq!(anchor, at(7200));
    }

    #[test]
    fn overdue_tick_fires_once_then_realigns() {
        let interval = Duration::seconds(3600);
        // Stalled until t=4000: the t=3600 tick is overdue.
        let (fire, anchor) = next_interval_fire(at(0), interval, at(4000));
        assert_eq!(fire, at(4000));
        assert_eq!(anchor, at(3600));

        // Cadence resumes on the original grid.
        let (fire, _) = next_interval_fire(anchor, interval, at(4005));
        assert_eq!(fire, at(7200));
    }

    #[test]
    fn multiple_missed_ticks_do_not_burst() {
        let interval = Duration::seconds(3600);
        // Three ticks missed; exactly one catch-up fire.
        let (fire, anchor) = next_interval_fire(at(0), interval, at(11_000));
        assert_eq!(fire, at(11_000));
        assert_eq!(anchor, at(10_800));

        let (fire, _) = next_interval_fire(anchor, interval, at(11_001));
        assert_eq!(fire, at(14_400));
    }
}
