//! Per-run accounting.

use chrono::{DateTime, Utc};

/// One candidate that could not be copied.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub hash: String,
    pub filename: String,
    pub reason: String,
}

/// Immutable record of one finished job run, consumed by the logging
/// layer. Exactly one report exists per run; a trigger dropped for
/// overlap produces none.
#[derive(Debug, Clone)]
pub struct JobRunReport {
    pub job: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Torrents present in source, absent in destination by hash.
    pub candidates: usize,
    pub added: usize,
    /// Candidates the destination already held (duplicate submission).
    pub skipped: usize,
    pub failed: usize,
    /// Per-item failures, in submission order.
    pub errors: Vec<ItemFailure>,
    /// Set when the diff stage failed; the run processed zero candidates.
    pub diff_error: Option<String>,
    /// True when shutdown stopped the run before all candidates were
    /// submitted.
    pub drained: bool,
}

impl JobRunReport {
    pub(crate) fn started(job: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            job: job.to_string(),
            started_at,
            finished_at: started_at,
            candidates: 0,
            added: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            diff_error: None,
            drained: false,
        }
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
