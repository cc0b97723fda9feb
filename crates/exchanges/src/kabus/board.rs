//! Board (quote snapshot) parsing.
//!
//! A board embeds ten levels per side as `Buy1..Buy10` and `Sell1..Sell10`,
//! each `{"Price": .., "Qty": ..}`. Level 1 is the best price.

use chrono::DateTime;
use serde_json::Value;
use tradegate_core::fields::{safe_decimal, safe_string};
use tradegate_core::{OrderBook, PriceLevel, Ticker};

pub const BID_KEYS: [&str; 10] = [
    "Buy1", "Buy2", "Buy3", "Buy4", "Buy5", "Buy6", "Buy7", "Buy8", "Buy9", "Buy10",
];

pub const ASK_KEYS: [&str; 10] = [
    "Sell1", "Sell2", "Sell3", "Sell4", "Sell5", "Sell6", "Sell7", "Sell8", "Sell9", "Sell10",
];

/// Levels present under `keys`, in key order. Levels without a price or
/// quantity are skipped.
pub fn parse_levels(board: &Value, keys: &[&str]) -> Vec<PriceLevel> {
    keys.iter()
        .filter_map(|key| board.get(*key))
        .filter_map(|level| {
            let price = safe_decimal(level, "Price")?;
            let qty = safe_decimal(level, "Qty")?;
            Some(PriceLevel::new(price, qty))
        })
        .collect()
}

pub fn parse_order_book(board: &Value, symbol: &str, limit: Option<usize>) -> OrderBook {
    let bids = parse_levels(board, &BID_KEYS);
    let asks = parse_levels(board, &ASK_KEYS);
    OrderBook::new(symbol, bids, asks, None)
        .with_info(board.clone())
        .truncate(limit)
}

/// `CurrentPriceTime` and friends are RFC 3339 with a +09:00 offset.
fn parse_time(board: &Value, key: &str) -> Option<i64> {
    let text = safe_string(board, key)?;
    DateTime::parse_from_rfc3339(&text)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

pub fn parse_ticker(board: &Value, symbol: &str) -> Ticker {
    let best_bid = board.get(BID_KEYS[0]);
    let best_ask = board.get(ASK_KEYS[0]);
    Ticker {
        symbol: symbol.to_string(),
        timestamp: parse_time(board, "CurrentPriceTime"),
        high: safe_decimal(board, "HighPrice"),
        low: safe_decimal(board, "LowPrice"),
        bid: best_bid.and_then(|l| safe_decimal(l, "Price")),
        bid_volume: best_bid.and_then(|l| safe_decimal(l, "Qty")),
        ask: best_ask.and_then(|l| safe_decimal(l, "Price")),
        ask_volume: best_ask.and_then(|l| safe_decimal(l, "Qty")),
        vwap: safe_decimal(board, "VWAP"),
        open: safe_decimal(board, "OpeningPrice"),
        last: safe_decimal(board, "CurrentPrice"),
        previous_close: safe_decimal(board, "PreviousClose"),
        change: safe_decimal(board, "ChangePreviousClose"),
        percentage: safe_decimal(board, "ChangePreviousClosePer"),
        base_volume: safe_decimal(board, "TradingVolume"),
        quote_volume: safe_decimal(board, "TradingValue"),
        info: board.clone(),
        ..Default::default()
    }
    .complete()
}
