use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Validation failed. Every problem found is reported, not just the
    /// first one.
    #[error("invalid configuration:{}", format_issues(.0))]
    Invalid(Vec<String>),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

fn format_issues(issues: &[String]) -> String {
    issues
        .iter()
        .map(|issue| format!("\n  - {issue}"))
        .collect()
}

pub type Result<T> = std::result::Result<T, Error>;
