//! Paymium payload parsers.

use crate::{ExchangeError, ExchangeResult};
use serde_json::Value;
use tradegate_core::fields::{iso8601, safe_decimal, safe_string, safe_timestamp};
use tradegate_core::{
    precise, Account, Balances, Currency, Market, OrderBook, OrderSide, PriceLevel, Ticker, Trade,
};

/// Field holding the free balance of a currency, e.g. `balance_btc`.
pub fn balance_field(currency_id: &str) -> String {
    format!("balance_{}", currency_id)
}

/// Field holding the locked balance of a currency, e.g. `locked_btc`.
pub fn locked_field(currency_id: &str) -> String {
    format!("locked_{}", currency_id)
}

/// Field holding a trade's base amount, e.g. `traded_btc`.
pub fn traded_field(base: &str) -> String {
    format!("traded_{}", base.to_lowercase())
}

/// `GET data/{currency}/ticker`.
pub fn parse_ticker(ticker: &Value, market: &Market) -> Ticker {
    let vwap = safe_string(ticker, "vwap");
    let base_volume = safe_string(ticker, "volume");
    let quote_volume = precise::string_mul(base_volume.as_deref(), vwap.as_deref());
    let last = safe_decimal(ticker, "price");

    Ticker {
        symbol: market.symbol.clone(),
        timestamp: safe_timestamp(ticker, "at"),
        high: safe_decimal(ticker, "high"),
        low: safe_decimal(ticker, "low"),
        bid: safe_decimal(ticker, "bid"),
        ask: safe_decimal(ticker, "ask"),
        vwap: precise::parse_number(vwap.as_deref()),
        open: safe_decimal(ticker, "open"),
        close: last,
        last,
        percentage: safe_decimal(ticker, "variation"),
        base_volume: precise::parse_number(base_volume.as_deref()),
        quote_volume: precise::parse_number(quote_volume.as_deref()),
        info: ticker.clone(),
        ..Default::default()
    }
    .complete()
}

/// One entry of `GET data/{currency}/trades`.
pub fn parse_trade(trade: &Value, market: &Market) -> Trade {
    let timestamp = safe_timestamp(trade, "created_at_int");
    let price = safe_string(trade, "price");
    let amount = safe_string(trade, &traded_field(&market.base));
    let cost = precise::string_mul(price.as_deref(), amount.as_deref());

    Trade {
        id: safe_string(trade, "uuid"),
        timestamp,
        datetime: timestamp.and_then(iso8601),
        symbol: Some(market.symbol.clone()),
        side: safe_string(trade, "side").and_then(|s| s.parse::<OrderSide>().ok()),
        price: precise::parse_number(price.as_deref()),
        amount: precise::parse_number(amount.as_deref()),
        cost: precise::parse_number(cost.as_deref()),
        info: trade.clone(),
        ..Default::default()
    }
}

pub fn parse_trades(response: &Value, market: &Market) -> ExchangeResult<Vec<Trade>> {
    let trades = response
        .as_array()
        .ok_or_else(|| ExchangeError::Parse(format!("paymium trades: expected an array, got {}", response)))?;
    Ok(trades.iter().map(|t| parse_trade(t, market)).collect())
}

fn parse_side(side: Option<&Value>) -> Vec<PriceLevel> {
    side.and_then(Value::as_array)
        .map(|levels| {
            levels
                .iter()
                .filter_map(|level| {
                    Some(PriceLevel::new(
                        safe_decimal(level, "price")?,
                        safe_decimal(level, "amount")?,
                    ))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `GET data/{currency}/depth`: `bids`/`asks` arrays of `{price, amount}`.
pub fn parse_order_book(response: &Value, symbol: &str) -> OrderBook {
    OrderBook::new(
        symbol,
        parse_side(response.get("bids")),
        parse_side(response.get("asks")),
        None,
    )
    .with_info(response.clone())
}

/// `GET user`. Currencies without a `balance_<id>` field are omitted.
pub fn parse_balance(response: &Value, currencies: &[Currency]) -> Balances {
    let mut balances = Balances::new(response.clone());
    for currency in currencies {
        let free_key = balance_field(&currency.id);
        if response.get(&free_key).is_none() {
            continue;
        }
        let free = safe_string(response, &free_key);
        let used = safe_string(response, &locked_field(&currency.id));
        balances.insert(
            currency.code.as_str(),
            Account::from_strings(free.as_deref(), used.as_deref()),
        );
    }
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn btc_eur() -> Market {
        super::super::btc_eur_market()
    }

    #[test]
    fn test_field_names() {
        assert_eq!(balance_field("btc"), "balance_btc");
        assert_eq!(locked_field("eur"), "locked_eur");
        assert_eq!(traded_field("BTC"), "traded_btc");
    }

    #[test]
    fn test_parse_ticker() {
        let raw = json!({
            "high": "33740.82",
            "low": "32185.15",
            "volume": "4.7890433",
            "bid": "33313.53",
            "ask": "33497.97",
            "midpoint": "33405.75",
            "vwap": "32802.5263553",
            "at": 1643381654,
            "price": "33143.91",
            "open": "33116.86",
            "variation": "0.0817",
            "currency": "EUR",
            "trade_id": "ce2f5152-3ac5-412d-9b24-9fa72338474c",
            "size": "0.00041087"
        });
        let ticker = parse_ticker(&raw, &btc_eur());
        assert_eq!(ticker.symbol, "BTC/EUR");
        assert_eq!(ticker.timestamp, Some(1_643_381_654_000));
        assert_eq!(ticker.datetime.as_deref(), Some("2022-01-28T14:54:14.000Z"));
        assert_eq!(ticker.last.unwrap().to_string(), "33143.91");
        assert_eq!(ticker.close, ticker.last);
        assert_eq!(ticker.percentage.unwrap().to_string(), "0.0817");
        assert_eq!(ticker.quote_volume.unwrap().to_string(), "157092.71906492288449");
        assert_eq!(ticker.change.unwrap().to_string(), "27.05");
    }

    #[test]
    fn test_quote_volume_is_exact() {
        let ticker = parse_ticker(&json!({"volume": "2.0", "vwap": "100"}), &btc_eur());
        assert_eq!(ticker.quote_volume.unwrap().to_string(), "200");
    }

    #[test]
    fn test_quote_volume_missing_vwap() {
        let ticker = parse_ticker(&json!({"volume": "2.0"}), &btc_eur());
        assert_eq!(ticker.quote_volume, None);
        assert_eq!(ticker.base_volume.unwrap().to_string(), "2.0");
    }

    #[test]
    fn test_parse_trade() {
        let raw = json!({
            "uuid": "968f4580-e26c-4ad8-8bcd-874d23d55296",
            "side": "buy",
            "price": "32000.5",
            "traded_btc": "0.01",
            "created_at_int": 1643381654,
        });
        let trade = parse_trade(&raw, &btc_eur());
        assert_eq!(trade.id.as_deref(), Some("968f4580-e26c-4ad8-8bcd-874d23d55296"));
        assert_eq!(trade.side, Some(OrderSide::Buy));
        assert_eq!(trade.amount.unwrap().to_string(), "0.01");
        assert_eq!(trade.cost.unwrap().to_string(), "320.005");
        assert_eq!(trade.timestamp, Some(1_643_381_654_000));
        assert_eq!(trade.symbol.as_deref(), Some("BTC/EUR"));
    }

    #[test]
    fn test_parse_trades_rejects_non_array() {
        assert!(matches!(
            parse_trades(&json!({"errors": []}), &btc_eur()),
            Err(ExchangeError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_order_book() {
        let raw = json!({
            "bids": [
                {"timestamp": 1643381000, "amount": "0.5", "price": "33000", "currency": "EUR"},
                {"timestamp": 1643381001, "amount": "1.0", "price": "33100", "currency": "EUR"}
            ],
            "asks": [
                {"timestamp": 1643381002, "amount": "0.2", "price": "33500", "currency": "EUR"}
            ]
        });
        let book = parse_order_book(&raw, "BTC/EUR");
        assert_eq!(book.bids[0].price().to_string(), "33100");
        assert_eq!(book.bids[1].amount().to_string(), "0.5");
        assert_eq!(book.asks.len(), 1);
        assert_eq!(book.spread(), Some(Decimal::from(400)));
        assert_eq!(book.info, raw);
    }

    #[test]
    fn test_parse_balance() {
        let raw = json!({
            "name": "BC-U123456",
            "balance_btc": "0.00041087",
            "locked_btc": "1.1",
            "balance_eur": "25.5",
        });
        let balances = parse_balance(&raw, &btc_eur().currencies());
        assert_eq!(balances.free("BTC").unwrap().to_string(), "0.00041087");
        assert_eq!(balances.used("BTC").unwrap().to_string(), "1.1");
        assert_eq!(balances.total("BTC").unwrap().to_string(), "1.10041087");
        assert_eq!(balances.free("EUR").unwrap().to_string(), "25.5");
        assert_eq!(balances.used("EUR"), None);
        assert_eq!(balances.info, raw);
    }

    #[test]
    fn test_parse_balance_omits_absent_currencies() {
        let balances = parse_balance(&json!({"balance_eur": "1"}), &btc_eur().currencies());
        assert_eq!(balances.currencies().collect::<Vec<_>>(), vec!["EUR"]);
    }
}
