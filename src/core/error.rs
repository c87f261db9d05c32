//! Failure taxonomy shared by every rate operation.

use thiserror::Error;

/// Coarse classification of a [`RateError`], stable for callers to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transport,
    Upstream,
    Decode,
    Configuration,
    UnsupportedCurrency,
    InvalidRequest,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    /// Connection failure, timeout or an interrupted body read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-success status, or the breaker is open.
    #[error("Upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// The payload did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Provider {0} is not supported.")]
    Configuration(String),

    #[error("Currency '{0}' is not supported.")]
    UnsupportedCurrency(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RateError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RateError::Transport(_) => FailureKind::Transport,
            RateError::Upstream { .. } => FailureKind::Upstream,
            RateError::Decode(_) => FailureKind::Decode,
            RateError::Configuration(_) => FailureKind::Configuration,
            RateError::UnsupportedCurrency(_) => FailureKind::UnsupportedCurrency,
            RateError::InvalidRequest(_) => FailureKind::InvalidRequest,
        }
    }

    /// Only network-level and status failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), FailureKind::Transport | FailureKind::Upstream)
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        RateError::InvalidRequest(message.into())
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        RateError::Decode(message.into())
    }
}

impl From<reqwest::Error> for RateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RateError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RateError::Upstream {
                status: Some(status.as_u16()),
                message: err.to_string(),
            }
        } else {
            RateError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RateError {
    fn from(err: serde_json::Error) -> Self {
        RateError::Decode(err.to_string())
    }
}
