//! Normalized ticker snapshot.

use crate::fields;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 24h statistics and top of book for one market.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub bid_volume: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub ask_volume: Option<Decimal>,
    pub vwap: Option<Decimal>,
    pub open: Option<Decimal>,
    pub close: Option<Decimal>,
    pub last: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub change: Option<Decimal>,
    pub percentage: Option<Decimal>,
    pub average: Option<Decimal>,
    pub base_volume: Option<Decimal>,
    pub quote_volume: Option<Decimal>,
    /// Raw exchange payload.
    pub info: Value,
}

impl Ticker {
    /// Fill the fields derivable from the others: `datetime` from `timestamp`,
    /// `last`/`close` from each other, `change` and `average` from `open` and `last`.
    pub fn complete(mut self) -> Self {
        if self.datetime.is_none() {
            self.datetime = self.timestamp.and_then(fields::iso8601);
        }
        if self.last.is_none() {
            self.last = self.close;
        }
        if self.close.is_none() {
            self.close = self.last;
        }
        if let (Some(open), Some(last)) = (self.open, self.last) {
            if self.change.is_none() {
                self.change = last.checked_sub(open).map(|d| d.normalize());
            }
            if self.average.is_none() {
                self.average = last
                    .checked_add(open)
                    .and_then(|sum| sum.checked_div(Decimal::TWO))
                    .map(|d| d.normalize());
            }
        }
        self
    }

    /// Ask minus bid, when both sides are known.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid),
            _ => None,
        }
    }
}
