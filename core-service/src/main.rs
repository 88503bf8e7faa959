//! `debrid-syncd`: scheduled one-way sync between Real-Debrid accounts.

use anyhow::Context;
use clap::Parser;
use core_runtime::config::Settings;
use core_runtime::logging::init_logging;
use core_service::Daemon;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// How long a drain may take before the process exits anyway.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(
    name = "debrid-syncd",
    version,
    about = "Scheduled one-way torrent sync between Real-Debrid accounts"
)]
struct Args {
    /// Path to the YAML config file. Defaults to
    /// ~/.config/debrid-sync/config.yaml.
    #[arg(short, long, env = "DEBRID_SYNC_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let path = args
        .config
        .or_else(default_config_path)
        .context("no --config given and no user config directory found")?;

    let settings = Settings::load(&path)?;
    init_logging(&settings.log)?;
    info!(config = %path.display(), "configuration loaded");

    let daemon = Daemon::start(&settings)?;

    wait_for_shutdown_signal()
        .await
        .context("failed to listen for shutdown signals")?;
    info!("shutdown signal received, draining");

    if tokio::time::timeout(DRAIN_TIMEOUT, daemon.shutdown())
        .await
        .is_err()
    {
        warn!(
            timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timed out, exiting with work in flight"
        );
    }
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("debrid-sync").join("config.yaml"))
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
