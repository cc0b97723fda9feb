//! Market (tradable instrument) definitions.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive bounds; either side may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl MinMax {
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    /// Both bounds known.
    pub fn bounded(min: Decimal, max: Decimal) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// True unless both bounds are known and `min > max`.
    pub fn is_ordered(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    /// Check a value against the known bounds.
    pub fn contains(&self, value: Decimal) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Order limits for a market. Cost is `price * amount`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketLimits {
    pub amount: MinMax,
    pub price: MinMax,
    pub cost: MinMax,
}

impl MarketLimits {
    /// Every pair of bounds is ordered.
    pub fn is_consistent(&self) -> bool {
        self.amount.is_ordered() && self.price.is_ordered() && self.cost.is_ordered()
    }
}

/// A currency known through the loaded markets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency {
    /// Unified code, e.g. "BTC".
    pub code: CompactString,
    /// Exchange-specific id, e.g. "btc".
    pub id: String,
}

/// Tradable instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Exchange-specific id used in request paths.
    pub id: String,
    /// Unified symbol, e.g. "BTC/EUR".
    pub symbol: String,
    pub base: CompactString,
    pub quote: CompactString,
    pub base_id: String,
    pub quote_id: String,
    pub spot: bool,
    pub active: bool,
    pub maker: Option<Decimal>,
    pub taker: Option<Decimal>,
    /// Minimum trading unit (lot size), when the venue has one.
    pub min_unit: Option<Decimal>,
    pub limits: MarketLimits,
    /// Raw definition the market was built from.
    pub info: Value,
}

impl Market {
    /// Base and quote currencies of this market.
    pub fn currencies(&self) -> [Currency; 2] {
        [
            Currency {
                code: self.base.clone(),
                id: self.base_id.clone(),
            },
            Currency {
                code: self.quote.clone(),
                id: self.quote_id.clone(),
            },
        ]
    }
}
