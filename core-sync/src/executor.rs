//! Sync executor.
//!
//! Runs one job end to end: diff the two accounts, then submit every
//! missing torrent to the destination in diff order. At most one run per
//! job is ever in flight; a trigger that arrives while the previous run
//! is still going is dropped, never queued.

use async_trait::async_trait;
use bridge_traits::time::Clock;
use core_sched::JobRunner;
use provider_realdebrid::{AddOutcome, Torrent, TorrentCatalog};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::diff::diff;
use crate::report::{ItemFailure, JobRunReport};

/// Result of triggering a job.
#[derive(Debug)]
pub enum RunOutcome {
    /// The run executed; exactly one report was produced.
    Completed(JobRunReport),
    /// The trigger was dropped because a previous run is still in
    /// flight. No report, no API calls.
    Skipped,
}

/// Executes one configured sync job.
pub struct SyncExecutor {
    job: String,
    source: Arc<dyn TorrentCatalog>,
    destination: Arc<dyn TorrentCatalog>,
    dry_run: bool,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    in_flight: Mutex<()>,
}

impl SyncExecutor {
    pub fn new(
        job: impl Into<String>,
        source: Arc<dyn TorrentCatalog>,
        destination: Arc<dyn TorrentCatalog>,
        dry_run: bool,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            job: job.into(),
            source,
            destination,
            dry_run,
            clock,
            shutdown,
            in_flight: Mutex::new(()),
        }
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    /// Run the job once.
    ///
    /// A diff-stage failure produces a report with zero candidates and
    /// the error recorded; per-item failures never abort the run. On
    /// shutdown the current item finishes but no further candidates are
    /// submitted.
    pub async fn execute(&self) -> RunOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!(job = %self.job, "previous run still in flight, trigger dropped");
            return RunOutcome::Skipped;
        };

        let mut report = JobRunReport::started(&self.job, self.clock.now());
        info!(
            job = %self.job,
            source = self.source.account(),
            destination = self.destination.account(),
            dry_run = self.dry_run,
            "sync run started"
        );

        match diff(self.source.as_ref(), self.destination.as_ref()).await {
            Err(e) => {
                error!(job = %self.job, error = %e, "diff failed, run aborted");
                report.diff_error = Some(e.to_string());
            }
            Ok(outcome) => {
                report.candidates = outcome.candidates.len();
                debug!(
                    job = %self.job,
                    source_total = outcome.source_total,
                    destination_total = outcome.destination_total,
                    candidates = report.candidates,
                    "submitting missing torrents"
                );
                self.submit_candidates(&outcome.candidates, &mut report)
                    .await;
            }
        }

        report.finished_at = self.clock.now();
        // The one structured event per run the logging collaborator
        // consumes.
        info!(
            job = %self.job,
            candidates = report.candidates,
            added = report.added,
            skipped = report.skipped,
            failed = report.failed,
            drained = report.drained,
            duration_ms = report.duration().num_milliseconds(),
            "sync run finished"
        );
        RunOutcome::Completed(report)
    }

    async fn submit_candidates(&self, candidates: &[Torrent], report: &mut JobRunReport) {
        for torrent in candidates {
            if self.shutdown.is_cancelled() {
                report.drained = true;
                warn!(
                    job = %self.job,
                    submitted = report.added + report.skipped + report.failed,
                    total = report.candidates,
                    "shutdown requested, draining run"
                );
                break;
            }

            if self.dry_run {
                info!(
                    job = %self.job,
                    hash = %torrent.hash,
                    filename = %torrent.filename,
                    "dry run, would add torrent"
                );
                report.added += 1;
                continue;
            }

            match self.copy_torrent(torrent).await {
                Ok(AddOutcome::Added { id }) => {
                    report.added += 1;
                    info!(
                        job = %self.job,
                        hash = %torrent.hash,
                        filename = %torrent.filename,
                        destination_id = %id,
                        "torrent added"
                    );
                }
                Ok(AddOutcome::AlreadyExists) => {
                    report.skipped += 1;
                    debug!(
                        job = %self.job,
                        hash = %torrent.hash,
                        "already present in destination"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        job = %self.job,
                        hash = %torrent.hash,
                        filename = %torrent.filename,
                        error = %e,
                        "torrent copy failed"
                    );
                    report.errors.push(ItemFailure {
                        hash: torrent.hash.clone(),
                        filename: torrent.filename.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Copy one torrent, mirroring the file selection of the source.
    async fn copy_torrent(&self, torrent: &Torrent) -> provider_realdebrid::Result<AddOutcome> {
        let info = self.source.torrent_info(&torrent.id).await?;
        let selected = info.selected_file_ids();
        self.destination
            .add_magnet(&torrent.hash, Some(&selected))
            .await
    }
}

#[async_trait]
impl JobRunner for SyncExecutor {
    async fn fire(&self) {
        let _ = self.execute().await;
    }
}
