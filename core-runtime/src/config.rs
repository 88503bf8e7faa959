//! # Configuration
//!
//! YAML-backed settings for the sync daemon.
//!
//! ## Overview
//!
//! A config file declares the API settings, the logging settings, a set
//! of named accounts, and a set of named sync jobs referencing those
//! accounts. Everything except accounts has sensible defaults, so a
//! minimal file is just `accounts` plus `syncs`.
//!
//! Validation is fail-fast at startup but exhaustive within the file:
//! every problem is collected and reported in one error rather than one
//! per restart.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::Settings;
//!
//! let settings = Settings::load(Path::new("/etc/debrid-sync/config.yaml"))?;
//! for (name, job) in &settings.syncs {
//!     println!("{name}: {} -> {}", job.source, job.destination);
//! }
//! ```

use crate::error::{Error, Result};
use core_sched::Schedule;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Root of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub log: LogSettings,
    /// Named Real-Debrid accounts, keyed by the label sync jobs use.
    pub accounts: BTreeMap<String, AccountSettings>,
    #[serde(default)]
    pub syncs: BTreeMap<String, SyncJobSettings>,
}

/// Transport and rate-limit settings shared by every account client.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Documented Real-Debrid ceilings are 250/min overall and 75/min on
/// the torrents namespace; the defaults stay at those ceilings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSettings {
    #[serde(default = "default_general_per_minute")]
    pub general_per_minute: u32,
    #[serde(default = "default_torrents_per_minute")]
    pub torrents_per_minute: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            general_per_minute: default_general_per_minute(),
            torrents_per_minute: default_torrents_per_minute(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line.
    Pretty,
    /// One JSON object per event.
    Json,
    /// Single-line human-readable.
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSettings {
    /// API token from <https://real-debrid.com/apitoken>.
    pub token: String,
    /// Free-form label, only for humans reading the file.
    #[serde(default)]
    pub description: Option<String>,
}

/// One directed sync job between two named accounts.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncJobSettings {
    pub source: String,
    pub destination: String,
    pub schedule: ScheduleSettings,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub dry_run: bool,
}

/// Schedule declaration, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScheduleSettings {
    /// Fixed interval on a drift-free grid.
    Interval { seconds: u64 },
    /// Five-field cron expression. Always evaluated in UTC, never the
    /// host timezone; a job declared `0 4 * * *` fires at 04:00 UTC.
    Cron { expression: String },
}

impl ScheduleSettings {
    /// Build the runnable schedule this declaration describes.
    pub fn build(&self) -> core_sched::Result<Schedule> {
        match self {
            Self::Interval { seconds } => Schedule::interval(*seconds),
            Self::Cron { expression } => Schedule::cron(expression),
        }
    }
}

impl Settings {
    /// Load and validate settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate settings from a YAML string.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-references and value ranges, collecting every
    /// problem found.
    fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        for (name, account) in &self.accounts {
            if account.token.trim().is_empty() {
                issues.push(format!("account `{name}`: token is empty"));
            }
        }

        if self.api.rate_limit.general_per_minute == 0 {
            issues.push("api.rate_limit.general_per_minute must be positive".into());
        }
        if self.api.rate_limit.torrents_per_minute == 0 {
            issues.push("api.rate_limit.torrents_per_minute must be positive".into());
        }
        if self.api.page_size == 0 {
            issues.push("api.page_size must be positive".into());
        }

        for (name, job) in &self.syncs {
            if !self.accounts.contains_key(&job.source) {
                issues.push(format!(
                    "sync `{name}`: unknown source account `{}`",
                    job.source
                ));
            }
            if !self.accounts.contains_key(&job.destination) {
                issues.push(format!(
                    "sync `{name}`: unknown destination account `{}`",
                    job.destination
                ));
            }
            if job.source == job.destination {
                issues.push(format!(
                    "sync `{name}`: source and destination are both `{}`",
                    job.source
                ));
            }
            if let Err(e) = job.schedule.build() {
                issues.push(format!("sync `{name}`: {e}"));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::Invalid(issues))
        }
    }
}

fn default_base_url() -> String {
    "https://api.real-debrid.com/rest/1.0".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_page_size() -> u32 {
    2000
}

fn default_general_per_minute() -> u32 {
    250
}

fn default_torrents_per_minute() -> u32 {
    75
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
api:
  base_url: https://api.real-debrid.com/rest/1.0
  timeout_seconds: 30
  page_size: 500
  rate_limit:
    general_per_minute: 200
    torrents_per_minute: 60
log:
  level: debug
  format: json
accounts:
  main:
    token: AAAA
    description: primary account
  backup:
    token: BBBB
syncs:
  mirror:
    source: main
    destination: backup
    schedule:
      type: interval
      seconds: 900
  nightly:
    source: backup
    destination: main
    schedule:
      type: cron
      expression: "0 4 * * *"
    enabled: false
    dry_run: true
"#;

    #[test]
    fn full_config_parses() {
        let settings = Settings::from_yaml(FULL).unwrap();
        assert_eq!(settings.api.timeout(), Duration::from_secs(30));
        assert_eq!(settings.api.rate_limit.torrents_per_minute, 60);
        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(settings.accounts.len(), 2);

        let mirror = &settings.syncs["mirror"];
        assert!(mirror.enabled);
        assert!(!mirror.dry_run);
        assert!(matches!(
            mirror.schedule,
            ScheduleSettings::Interval { seconds: 900 }
        ));

        let nightly = &settings.syncs["nightly"];
        assert!(!nightly.enabled);
        assert!(nightly.dry_run);
        nightly.schedule.build().unwrap();
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let settings = Settings::from_yaml(
            r#"
accounts:
  main:
    token: AAAA
"#,
        )
        .unwrap();
        assert_eq!(settings.api.base_url, "https://api.real-debrid.com/rest/1.0");
        assert_eq!(settings.api.timeout(), Duration::from_secs(60));
        assert_eq!(settings.api.page_size, 2000);
        assert_eq!(settings.api.rate_limit.general_per_minute, 250);
        assert_eq!(settings.api.rate_limit.torrents_per_minute, 75);
        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert!(settings.syncs.is_empty());
    }

    #[test]
    fn validation_collects_every_issue() {
        let result = Settings::from_yaml(
            r#"
accounts:
  main:
    token: ""
syncs:
  broken:
    source: main
    destination: main
    schedule:
      type: interval
      seconds: 0
  dangling:
    source: nowhere
    destination: main
    schedule:
      type: cron
      expression: "* * *"
"#,
        );

        let Err(Error::Invalid(issues)) = result else {
            panic!("expected validation failure");
        };
        let rendered = issues.join("\n");
        assert!(rendered.contains("account `main`: token is empty"));
        assert!(rendered.contains("source and destination are both `main`"));
        assert!(rendered.contains("sync `broken`:"));
        assert!(rendered.contains("unknown source account `nowhere`"));
        assert!(issues.len() >= 4, "issues: {issues:?}");
    }

    #[test]
    fn oversized_interval_is_a_validation_issue() {
        // u64::MAX seconds parses as YAML but must be collected as an
        // issue, not panic or slip through as a negative interval.
        let result = Settings::from_yaml(
            r#"
accounts:
  main:
    token: AAAA
  backup:
    token: BBBB
syncs:
  glacial:
    source: main
    destination: backup
    schedule:
      type: interval
      seconds: 18446744073709551615
"#,
        );

        let Err(Error::Invalid(issues)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("sync `glacial`"));
        assert!(issues[0].contains("exceeds the maximum"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Settings::from_yaml(
            r#"
accounts:
  main:
    token: AAAA
    tokne: typo
"#,
        );
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn missing_accounts_section_is_a_parse_error() {
        assert!(matches!(
            Settings::from_yaml("syncs: {}"),
            Err(Error::Parse(_))
        ));
    }
}
