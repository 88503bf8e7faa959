//! Per-job timer tasks.
//!
//! The scheduler spawns one task per enabled job. Each task sleeps until
//! the next fire instant, triggers the job's [`JobRunner`] without
//! awaiting it, and re-arms. All fired runs and timer tasks are tracked
//! so shutdown can drain in-flight work.

use async_trait::async_trait;
use bridge_traits::time::Clock;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::schedule::{next_interval_fire, Schedule};

/// Something the scheduler can trigger.
///
/// Implementations must tolerate overlapping triggers for the same job;
/// the scheduler fires without waiting for the previous run to finish.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn fire(&self);
}

/// Owns the timer task of every enabled sync job.
pub struct SyncScheduler {
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl SyncScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Token cancelled at shutdown; runners use it to stop submitting
    /// new work mid-run.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Arm a job's timer. The first interval tick fires immediately.
    pub fn add_job(&self, name: impl Into<String>, schedule: Schedule, runner: Arc<dyn JobRunner>) {
        let name = name.into();
        let clock = Arc::clone(&self.clock);
        let shutdown = self.shutdown.clone();
        let tracker = self.tracker.clone();

        info!(job = %name, schedule = ?schedule, "job armed");

        self.tracker.spawn(Self::timer_loop(
            name, schedule, runner, clock, shutdown, tracker,
        ));
    }

    /// Cancel all timers and wait for in-flight runs to finish.
    pub async fn shutdown(&self) {
        info!("scheduler stopping");
        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("scheduler stopped");
    }

    async fn timer_loop(
        name: String,
        schedule: Schedule,
        runner: Arc<dyn JobRunner>,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
        tracker: TaskTracker,
    ) {
        let Some(first) = schedule.first_fire(clock.now()) else {
            warn!(job = %name, "schedule has no future fire time; job disabled");
            return;
        };
        let mut fire_at = first;
        // Interval cadence anchor; always a point on the original grid.
        let mut anchor = first;

        loop {
            let now = clock.now();
            if fire_at > now {
                let delay = (fire_at - now).to_std().unwrap_or(StdDuration::ZERO);
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            if shutdown.is_cancelled() {
                break;
            }

            debug!(job = %name, scheduled = %fire_at, "firing job");
            let run = Arc::clone(&runner);
            tracker.spawn(async move { run.fire().await });

            match &schedule {
                Schedule::Interval(interval) => {
                    let (next, new_anchor) = next_interval_fire(anchor, *interval, clock.now());
                    fire_at = next;
                    anchor = new_anchor;
                }
                Schedule::Cron(cron_schedule) => {
                    match cron_schedule.after(&clock.now()).next() {
                        Some(next) => fire_at = next,
                        None => {
                            warn!(job = %name, "cron schedule exhausted; job disabled");
                            break;
                        }
                    }
                }
            }
        }
        debug!(job = %name, "timer task exiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::time::SystemClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRunner {
        fires: AtomicUsize,
    }

    impl CountingRunner {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fires: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl JobRunner for CountingRunner {
        async fn fire(&self) {
            self.fires.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn interval_job_fires_immediately_on_arm() {
        let scheduler = SyncScheduler::new(Arc::new(SystemClock));
        let runner = CountingRunner::new();

        scheduler.add_job(
            "warm-up",
            Schedule::interval(3600).unwrap(),
            runner.clone(),
        );

        tokio::time::sleep(StdDuration::from_millis(100)).await;
        assert_eq!(runner.fires.load(Ordering::SeqCst), 1);

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn cron_job_does_not_fire_before_its_minute() {
        let scheduler = SyncScheduler::new(Arc::new(SystemClock));
        let runner = CountingRunner::new();

        // Daily at 04:00; never within the test window.
        scheduler.add_job("nightly", Schedule::cron("0 4 * * *").unwrap(), runner.clone());

        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert_eq!(runner.fires.load(Ordering::SeqCst), 0);

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_waits_for_in_flight_fires() {
        struct SlowRunner {
            done: AtomicUsize,
        }

        #[async_trait]
        impl JobRunner for SlowRunner {
            async fn fire(&self) {
                tokio::time::sleep(StdDuration::from_millis(50)).await;
                self.done.fetch_add(1, Ordering::SeqCst);
            }
        }

        let scheduler = SyncScheduler::new(Arc::new(SystemClock));
        let runner = Arc::new(SlowRunner {
            done: AtomicUsize::new(0),
        });

        scheduler.add_job("slow", Schedule::interval(3600).unwrap(), runner.clone());

        // Give the timer task a chance to fire the run.
        tokio::time::sleep(StdDuration::from_millis(10)).await;
        scheduler.shutdown().await;

        assert_eq!(runner.done.load(Ordering::SeqCst), 1);
    }
}
