use thiserror::Error;

/// Errors surfaced by transport bridge implementations.
///
/// `Timeout` and `Connect` are kept as distinct variants because the API
/// layer retries them; everything else fails the call immediately.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether a fresh attempt of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
