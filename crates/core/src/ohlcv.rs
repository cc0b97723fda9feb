//! Candles.

use crate::{fields, CoreError, CoreResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One candle: `[timestamp, open, high, low, close, volume]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Candle open time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Ohlcv {
    /// Build from the leading six entries of a candle tuple.
    pub fn from_values(values: &[Value]) -> CoreResult<Self> {
        if values.len() < 6 {
            return Err(CoreError::InvalidCandle(format!(
                "expected 6 fields, got {}",
                values.len()
            )));
        }
        let field = |i: usize| {
            fields::value_to_decimal(&values[i])
                .ok_or_else(|| CoreError::InvalidCandle(format!("field {} is not numeric: {}", i, values[i])))
        };
        let timestamp = field(0)?
            .trunc()
            .to_i64()
            .ok_or_else(|| CoreError::InvalidCandle(format!("timestamp out of range: {}", values[0])))?;

        Ok(Self {
            timestamp,
            open: field(1)?,
            high: field(2)?,
            low: field(3)?,
            close: field(4)?,
            volume: field(5)?,
        })
    }
}
