//! Daemon bootstrap and wiring.
//!
//! This crate assembles the moving parts into a running service: one
//! HTTP transport and one process-wide rate limiter shared by every
//! account client, one `RealDebridClient` per configured account, one
//! `SyncExecutor` per enabled sync job, and a scheduler that owns their
//! timers. The `debrid-syncd` binary in `main.rs` loads the config,
//! starts the daemon and waits for a shutdown signal.

pub mod error;

pub use error::{Result, ServiceError};

use bridge_reqwest::ReqwestHttpClient;
use bridge_traits::time::{Clock, SystemClock};
use bridge_traits::HttpClient;
use core_runtime::config::Settings;
use core_sched::SyncScheduler;
use core_sync::SyncExecutor;
use provider_realdebrid::{ClientOptions, RateLimiter, RealDebridClient, TorrentCatalog};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// A fully wired, running sync daemon.
pub struct Daemon {
    scheduler: SyncScheduler,
    armed_jobs: usize,
}

impl Daemon {
    /// Wire up clients and executors from validated settings and arm
    /// every enabled job. Interval jobs fire their first run
    /// immediately.
    pub fn start(settings: &Settings) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // One limiter for the whole process: the quota is enforced per
        // origin, not per account.
        let limiter = Arc::new(RateLimiter::new(
            settings.api.rate_limit.general_per_minute,
            settings.api.rate_limit.torrents_per_minute,
        ));
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(settings.api.timeout())?);
        let options = ClientOptions {
            base_url: settings.api.base_url.clone(),
            page_size: settings.api.page_size,
            timeout: settings.api.timeout(),
            ..ClientOptions::default()
        };

        let mut catalogs: BTreeMap<&str, Arc<dyn TorrentCatalog>> = BTreeMap::new();
        for (name, account) in &settings.accounts {
            let client = RealDebridClient::new(
                name.clone(),
                account.token.clone(),
                Arc::clone(&http),
                Arc::clone(&limiter),
                options.clone(),
            );
            catalogs.insert(name.as_str(), Arc::new(client));
        }

        let scheduler = SyncScheduler::new(Arc::clone(&clock));
        let mut armed_jobs = 0;
        for (name, job) in &settings.syncs {
            if !job.enabled {
                info!(job = %name, "sync disabled, not arming");
                continue;
            }

            let schedule = job
                .schedule
                .build()
                .map_err(|source| ServiceError::Schedule {
                    job: name.clone(),
                    source,
                })?;
            let source = resolve_catalog(&catalogs, name, &job.source)?;
            let destination = resolve_catalog(&catalogs, name, &job.destination)?;

            let executor = Arc::new(SyncExecutor::new(
                name.clone(),
                source,
                destination,
                job.dry_run,
                Arc::clone(&clock),
                scheduler.shutdown_token(),
            ));
            scheduler.add_job(name.clone(), schedule, executor);
            armed_jobs += 1;
        }

        info!(
            accounts = settings.accounts.len(),
            jobs = armed_jobs,
            "daemon started"
        );
        Ok(Self {
            scheduler,
            armed_jobs,
        })
    }

    /// Number of jobs whose timers are armed.
    pub fn armed_jobs(&self) -> usize {
        self.armed_jobs
    }

    /// Stop all timers and wait for in-flight runs to drain.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }
}

fn resolve_catalog(
    catalogs: &BTreeMap<&str, Arc<dyn TorrentCatalog>>,
    job: &str,
    account: &str,
) -> Result<Arc<dyn TorrentCatalog>> {
    catalogs
        .get(account)
        .cloned()
        .ok_or_else(|| ServiceError::UnknownAccount {
            job: job.to_string(),
            account: account.to_string(),
        })
}
