//! Error types for exchange operations.

use std::time::Duration;
use thiserror::Error;
use tradegate_core::{CoreError, ExchangeId};

/// Errors that can occur while talking to an exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// A credential the adapter requires was not supplied.
    #[error("{exchange} requires the `{credential}` credential")]
    CredentialsMissing {
        exchange: ExchangeId,
        credential: &'static str,
    },

    /// The exchange reported a failure. `message` carries the response body.
    #[error("{exchange} {message}")]
    Exchange {
        exchange: ExchangeId,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{exchange} HTTP {status}: {body}")]
    Http {
        exchange: ExchangeId,
        status: u16,
        body: String,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Unknown symbol: {0}")]
    BadSymbol(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("{exchange} does not support {feature}")]
    NotSupported {
        exchange: ExchangeId,
        feature: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::Transport(err.to_string())
    }
}

impl From<CoreError> for ExchangeError {
    fn from(err: CoreError) -> Self {
        ExchangeError::Parse(err.to_string())
    }
}

impl ExchangeError {
    /// Shorthand for an exchange-reported failure.
    pub fn exchange(exchange: ExchangeId, message: impl Into<String>) -> Self {
        ExchangeError::Exchange {
            exchange,
            message: message.into(),
        }
    }

    /// Returns true if this error is transient and likely to succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            ExchangeError::Transport(_) => true,
            ExchangeError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error is permanent and requires manual intervention.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ExchangeError::CredentialsMissing { .. }
                | ExchangeError::BadSymbol(_)
                | ExchangeError::InvalidOrder(_)
                | ExchangeError::NotSupported { .. }
        )
    }

    /// Suggested delay before retrying. None for errors that should not be retried.
    pub fn suggested_retry_delay(&self) -> Option<Duration> {
        match self {
            ExchangeError::Http { status: 429, .. } => Some(Duration::from_secs(60)),
            ExchangeError::Http { status, .. } if *status >= 500 => Some(Duration::from_secs(5)),
            ExchangeError::Transport(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}
