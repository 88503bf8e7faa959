//! # Logging & Tracing Infrastructure
//!
//! Configures `tracing-subscriber` from the `log` section of the config
//! file, supporting:
//! - Pretty, JSON and compact output formats
//! - A default filter that keeps our crates at the configured level and
//!   HTTP-stack dependencies at `warn`
//! - `RUST_LOG` override for ad-hoc debugging
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::LogSettings;
//! use core_runtime::logging::init_logging;
//!
//! init_logging(&LogSettings::default())?;
//! tracing::info!("daemon started");
//! ```

use crate::config::{LogFormat, LogSettings};
use crate::error::{Error, Result};
use std::io;
use tracing::debug;
use tracing_subscriber::{
    filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Initialize the logging system.
///
/// Call once during startup; a second call returns an error because the
/// global subscriber is already set.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let filter = build_filter(settings)?;

    match settings.format {
        LogFormat::Pretty => init_pretty_logging(filter),
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Compact => init_compact_logging(filter),
    }?;

    debug!(level = %settings.level, format = ?settings.format, "logging initialised");
    Ok(())
}

fn build_filter(settings: &LogSettings) -> Result<EnvFilter> {
    // RUST_LOG wins over the config file when set.
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = settings.level.as_str();
    let filter_string = format!(
        "core_runtime={level},core_sched={level},core_sync={level},\
         core_service={level},provider_realdebrid={level},\
         bridge_reqwest={level},bridge_traits={level},\
         h2=warn,hyper=warn,reqwest=warn",
    );

    EnvFilter::try_new(filter_string)
        .map_err(|e| Error::Logging(format!("invalid log level {:?}: {e}", settings.level)))
}

fn init_pretty_logging(filter: EnvFilter) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(true)
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

fn init_json_logging(filter: EnvFilter) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_target(true)
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

fn init_compact_logging(filter: EnvFilter) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(true)
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        build_filter(&LogSettings::default()).unwrap();
    }

    #[test]
    fn second_init_errors_instead_of_panicking() {
        let settings = LogSettings::default();
        // The first call may lose the race with other tests for the
        // global subscriber; the repeat call must report Logging either way.
        let _ = init_logging(&settings);
        assert!(matches!(init_logging(&settings), Err(Error::Logging(_))));
    }

    #[test]
    fn bad_level_is_rejected() {
        let settings = LogSettings {
            level: "shouting".into(),
            format: LogFormat::Compact,
        };
        assert!(matches!(build_filter(&settings), Err(Error::Logging(_))));
    }
}
