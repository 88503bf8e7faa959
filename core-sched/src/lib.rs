//! # Job Scheduling Module
//!
//! Owns every piece of wall-clock logic in the daemon.
//!
//! ## Overview
//!
//! This module manages one timer task per enabled sync job:
//! - **Schedule model** (`schedule`): interval and 5-field cron schedules
//!   with pure next-fire computation, testable without real clocks
//! - **Scheduler** (`scheduler`): per-job timer tasks that trigger a
//!   [`JobRunner`] without awaiting it, re-arm from the *scheduled* fire
//!   time so execution duration never accumulates drift, and drain
//!   gracefully on shutdown
//!
//! Overlap protection is deliberately not handled here: the runner is
//! fired and forgotten, and the sync executor's single-flight lock drops
//! overlapping triggers for the same job.

pub mod error;
pub mod schedule;
pub mod scheduler;

pub use error::{Result, ScheduleError};
pub use schedule::{next_interval_fire, Schedule, MAX_INTERVAL_SECONDS};
pub use scheduler::{JobRunner, SyncScheduler};
