//! Order book snapshot.

use crate::fields;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One book level, serialized as `[price, amount]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel(pub Decimal, pub Decimal);

impl PriceLevel {
    pub fn new(price: Decimal, amount: Decimal) -> Self {
        Self(price, amount)
    }

    #[inline]
    pub fn price(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn amount(&self) -> Decimal {
        self.1
    }
}

/// Bids sorted by descending price, asks by ascending price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub nonce: Option<u64>,
    /// Raw exchange payload.
    pub info: Value,
}

impl OrderBook {
    /// Normalize raw levels into a sorted book.
    pub fn new(
        symbol: impl Into<String>,
        mut bids: Vec<PriceLevel>,
        mut asks: Vec<PriceLevel>,
        timestamp: Option<i64>,
    ) -> Self {
        bids.sort_by(|a, b| b.price().cmp(&a.price()));
        asks.sort_by(|a, b| a.price().cmp(&b.price()));
        Self {
            symbol: symbol.into(),
            bids,
            asks,
            timestamp,
            datetime: timestamp.and_then(fields::iso8601),
            nonce: None,
            info: Value::Null,
        }
    }

    /// Attach the raw payload the book was parsed from.
    pub fn with_info(mut self, info: Value) -> Self {
        self.info = info;
        self
    }

    /// Keep at most `depth` levels per side.
    pub fn truncate(mut self, depth: Option<usize>) -> Self {
        if let Some(depth) = depth {
            self.bids.truncate(depth);
            self.asks.truncate(depth);
        }
        self
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price() - self.best_bid()?.price())
    }
}
