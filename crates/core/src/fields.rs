//! Tolerant accessors for raw exchange JSON.
//!
//! Exchange payloads mix strings and numbers for the same field and omit
//! fields freely; these helpers return `None` instead of failing.

use crate::precise;
use chrono::{DateTime, SecondsFormat};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

/// Field as text. Numbers are rendered with their JSON spelling.
pub fn safe_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(value_to_string)
}

/// Field as an exact decimal.
pub fn safe_decimal(value: &Value, key: &str) -> Option<Decimal> {
    precise::parse_number(safe_string(value, key).as_deref())
}

/// Field as an integer. Accepts integral strings and numbers.
pub fn safe_integer(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Field holding Unix seconds, returned as milliseconds.
pub fn safe_timestamp(value: &Value, key: &str) -> Option<i64> {
    let seconds = safe_decimal(value, key)?;
    (seconds * Decimal::from(1000)).trunc().to_i64()
}

/// Render a scalar JSON value as text.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scalar JSON value as an exact decimal.
pub fn value_to_decimal(value: &Value) -> Option<Decimal> {
    precise::parse_number(value_to_string(value).as_deref())
}

/// ISO-8601 rendering of a millisecond timestamp, e.g. `2022-01-28T14:54:14.000Z`.
pub fn iso8601(timestamp_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
