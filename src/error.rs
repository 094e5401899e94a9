use thiserror::Error;

/// Rejected rate window settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: time unit is required")]
    MissingTimeUnit,
    #[error("invalid configuration: request limit must be positive, got {0}")]
    NonPositiveLimit(i64),
}

/// Failure reported by a transport while delivering one submission.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
#[error("failed to encode payload: {0}")]
pub struct EncodeError(#[from] pub serde_json::Error);

/// Why a `submit` or `flush` call stopped early.
///
/// In every case the submission that was being processed has already left
/// the pending queue and is not put back.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("send cancelled")]
    Cancelled,
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl DispatchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
