//! Normalized public trade.

use crate::{OrderSide, OrderType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One executed trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Option<String>,
    /// Order id, when the trade belongs to one of the user's orders.
    pub order: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub symbol: Option<String>,
    pub order_type: Option<OrderType>,
    pub side: Option<OrderSide>,
    pub price: Option<Decimal>,
    pub amount: Option<Decimal>,
    /// `price * amount`.
    pub cost: Option<Decimal>,
    /// Raw exchange payload.
    pub info: Value,
}

/// Sort trades by timestamp and keep those at or after `since`.
///
/// `limit` keeps the first trades from `since` onwards when `since` is given,
/// and the most recent ones otherwise.
pub fn filter_trades(mut trades: Vec<Trade>, since: Option<i64>, limit: Option<usize>) -> Vec<Trade> {
    trades.sort_by_key(|t| t.timestamp.unwrap_or(i64::MIN));
    if let Some(since) = since {
        trades.retain(|t| t.timestamp.is_some_and(|ts| ts >= since));
    }
    match (since, limit) {
        (Some(_), Some(limit)) => trades.truncate(limit),
        (None, Some(limit)) if trades.len() > limit => {
            trades.drain(..trades.len() - limit);
        }
        _ => {}
    }
    trades
}
