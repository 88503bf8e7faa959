//! Error types for the Real-Debrid provider.

use bridge_traits::error::BridgeError;
use std::time::Duration;
use thiserror::Error;

/// Real-Debrid provider errors.
#[derive(Error, Debug)]
pub enum RealDebridError {
    /// Token rejected (401/403). Never retried.
    #[error("authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    /// API-level error response, optionally with the documented
    /// Real-Debrid error code.
    #[error("Real-Debrid API error (status {status}, code {}): {message}", format_code(.code))]
    Api {
        status: u16,
        code: Option<i32>,
        message: String,
    },

    /// 429 after retries were exhausted.
    #[error("rate limited by server (retry after {})", format_retry_after(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Response body did not match the expected shape.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// Transport-level failure.
    #[error(transparent)]
    Transport(#[from] BridgeError),
}

impl RealDebridError {
    /// Whether a retry could help. 429, 5xx and transport
    /// timeouts/connection failures are transient; everything else is
    /// permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Transport(e) => e.is_transient(),
            Self::Auth { .. } | Self::Parse(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RealDebridError>;

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none".to_string(),
    }
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!("{}s", d.as_secs()),
        None => "unknown".to_string(),
    }
}

/// Human-readable text for the error codes the API documents.
pub fn error_code_message(code: i32) -> Option<&'static str> {
    let message = match code {
        1 => "Missing parameter",
        2 => "Bad parameter value",
        3 => "Unknown method",
        4 => "Method not allowed",
        5 => "Slow down",
        6 => "Resource unreachable",
        7 => "Resource not found",
        8 => "Bad token",
        9 => "Permission denied",
        10 => "Two-Factor authentication needed",
        11 => "Two-Factor authentication pending",
        12 => "Invalid login",
        13 => "Invalid password",
        14 => "Account locked",
        15 => "Account not activated",
        16 => "Unsupported hoster",
        17 => "Hoster in maintenance",
        18 => "Hoster limit reached",
        19 => "Hoster temporarily unavailable",
        20 => "Hoster not available for free users",
        21 => "Too many active downloads",
        22 => "IP Address not allowed",
        23 => "Traffic exhausted",
        24 => "File unavailable",
        25 => "Service unavailable",
        26 => "Upload too big",
        27 => "Upload error",
        28 => "File not allowed",
        29 => "Torrent too big",
        30 => "Torrent file invalid",
        31 => "Action already done",
        32 => "Image resolution error",
        33 => "Torrent already active",
        34 => "Too many requests",
        35 => "Infringing file",
        36 => "Fair Usage Limit",
        _ => return None,
    };
    Some(message)
}

/// Error codes the API uses to report a duplicate submission.
pub fn is_already_exists_code(code: i32) -> bool {
    // 31 "Action already done", 33 "Torrent already active"
    matches!(code, 31 | 33)
}
