//! Candles served from a local fixture file.
//!
//! The fixture maps a symbol to a list of candle tuples
//! `[timestamp, open, high, low, close, volume, <extra>]`; the trailing
//! field of each tuple is dropped.

use crate::{ExchangeError, ExchangeResult};
use serde_json::Value;
use std::path::Path;
use tradegate_core::Ohlcv;
use tracing::debug;

/// Default fixture location, relative to the working directory.
pub const DEFAULT_FIXTURE: &str = "kabuto_price.json";

/// Load the candles stored under the first of `keys` present in the fixture.
pub async fn load_candles(path: &Path, keys: &[&str]) -> ExchangeResult<Vec<Ohlcv>> {
    let text = tokio::fs::read_to_string(path).await?;
    let fixture: Value = serde_json::from_str(&text)?;
    debug!("kabus: read candle fixture {}", path.display());

    let rows = keys
        .iter()
        .find_map(|key| fixture.get(*key))
        .ok_or_else(|| ExchangeError::BadSymbol(format!("kabus {}", keys.first().unwrap_or(&""))))?;

    rows.as_array()
        .ok_or_else(|| ExchangeError::Parse("candle list is not an array".to_string()))?
        .iter()
        .map(parse_row)
        .collect()
}

fn parse_row(row: &Value) -> ExchangeResult<Ohlcv> {
    let values = row
        .as_array()
        .ok_or_else(|| ExchangeError::Parse(format!("candle is not an array: {}", row)))?;
    let trimmed = &values[..values.len().saturating_sub(1)];
    Ok(Ohlcv::from_values(trimmed)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::io::Write;

    fn fixture(content: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_candles_drops_last_field() {
        let file = fixture(&json!({
            "8306@1": [
                [1643331600000_i64, 2380, 2390, 2375, 2385, 120000, 42],
                [1643331660000_i64, 2385, 2395, 2380, 2390, 80000, 43],
            ]
        }));
        let candles = load_candles(file.path(), &["8306@1"]).await.unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1_643_331_600_000);
        assert_eq!(candles[0].close, Decimal::from(2385));
        assert_eq!(candles[1].volume, Decimal::from(80000));
    }

    #[tokio::test]
    async fn test_load_candles_falls_back_to_later_keys() {
        let file = fixture(&json!({"8306@1/JPY": [[1, 2, 3, 4, 5, 6, 7]]}));
        let candles = load_candles(file.path(), &["8306@1", "8306@1/JPY"]).await.unwrap();
        assert_eq!(candles.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_bad_symbol() {
        let file = fixture(&json!({"8306@1": []}));
        let err = load_candles(file.path(), &["9999@1"]).await.unwrap_err();
        assert!(matches!(err, ExchangeError::BadSymbol(_)));
    }

    #[tokio::test]
    async fn test_short_candle_is_parse_error() {
        let file = fixture(&json!({"8306@1": [[1, 2, 3, 4, 5, 6]]}));
        let err = load_candles(file.path(), &["8306@1"]).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Parse(_)));
    }

    #[tokio::test]
    async fn test_missing_fixture_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_candles(&dir.path().join("absent.json"), &["8306@1"])
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Io(_)));
    }
}
