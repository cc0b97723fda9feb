//! Error types for core conversions.

use thiserror::Error;

/// Errors raised while converting raw exchange values into core types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("Invalid candle: {0}")]
    InvalidCandle(String),

    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    #[error("Unknown order side: {0}")]
    UnknownSide(String),

    #[error("Unknown order type: {0}")]
    UnknownOrderType(String),
}

/// Result type for core conversions.
pub type CoreResult<T> = Result<T, CoreError>;
