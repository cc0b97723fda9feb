//! The host contract every adapter implements.

use crate::{
    ApiRequest, ExchangeError, ExchangeResult, HttpResponse, HttpTransport, MarketCache,
    SignedRequest,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tradegate_core::{
    Balances, ExchangeDescriptor, ExchangeId, Market, Ohlcv, Order, OrderBook, OrderSide,
    OrderType, Ticker, Trade,
};
use tracing::debug;

/// Longest body excerpt carried by HTTP and parse errors.
const BODY_EXCERPT: usize = 512;

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT).collect()
}

/// Exchange adapter.
///
/// Adapters supply the descriptor, market table, signing, error mapping and
/// parsers; the request pipeline and market caching are shared. Operations an
/// adapter does not offer fail with [`ExchangeError::NotSupported`].
#[async_trait]
pub trait Exchange: Send + Sync {
    fn id(&self) -> ExchangeId;

    /// Static description: endpoints, capabilities, credentials, fees.
    fn describe(&self) -> ExchangeDescriptor;

    fn transport(&self) -> &dyn HttpTransport;

    fn market_cache(&self) -> &MarketCache;

    /// Build the market table. Idempotent.
    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>>;

    /// Cached markets; fetched on first use or when `reload` is set.
    async fn load_markets(&self, reload: bool) -> ExchangeResult<Vec<Arc<Market>>> {
        self.market_cache()
            .get_or_load(reload, || self.fetch_markets())
            .await
    }

    /// Resolve a symbol against the loaded markets.
    async fn market(&self, symbol: &str) -> ExchangeResult<Arc<Market>> {
        self.load_markets(false).await?;
        self.market_cache().market(symbol)
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker>;

    async fn fetch_order_book(&self, symbol: &str, limit: Option<usize>)
        -> ExchangeResult<OrderBook>;

    /// Public trades, oldest first. `since` is in milliseconds.
    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Trade>>;

    async fn fetch_balance(&self) -> ExchangeResult<Balances> {
        Err(self.not_supported("fetchBalance"))
    }

    async fn create_order(
        &self,
        _symbol: &str,
        _order_type: OrderType,
        _side: OrderSide,
        _amount: Decimal,
        _price: Option<Decimal>,
    ) -> ExchangeResult<Order> {
        Err(self.not_supported("createOrder"))
    }

    /// Cancel an order; returns the raw exchange acknowledgement.
    async fn cancel_order(&self, _id: &str, _symbol: Option<&str>) -> ExchangeResult<Value> {
        Err(self.not_supported("cancelOrder"))
    }

    async fn fetch_ohlcv(
        &self,
        _symbol: &str,
        _timeframe: &str,
        _since: Option<i64>,
        _limit: Option<usize>,
    ) -> ExchangeResult<Vec<Ohlcv>> {
        Err(self.not_supported("fetchOHLCV"))
    }

    /// Turn an endpoint call into a fully authenticated HTTP request.
    async fn sign(&self, request: ApiRequest) -> ExchangeResult<SignedRequest>;

    /// Map exchange-specific error payloads to [`ExchangeError::Exchange`].
    /// Runs before the HTTP status check, so error envelopes returned with a
    /// 4xx status are still reported as exchange errors.
    fn handle_errors(&self, response: &HttpResponse, body: Option<&Value>) -> ExchangeResult<()>;

    /// Sign, send, map errors and parse the JSON body.
    async fn request(&self, request: ApiRequest) -> ExchangeResult<Value> {
        let signed = self.sign(request).await?;
        debug!("{}: {} {}", self.id(), signed.method, signed.url);

        let response = self.transport().execute(&signed).await?;
        let body = response.json();
        self.handle_errors(&response, body.as_ref())?;

        if !response.is_success() {
            return Err(ExchangeError::Http {
                exchange: self.id(),
                status: response.status,
                body: excerpt(&response.body),
            });
        }

        body.ok_or_else(|| {
            ExchangeError::Parse(format!(
                "{} returned a non-JSON body: {}",
                self.id(),
                excerpt(&response.body)
            ))
        })
    }

    fn not_supported(&self, feature: &'static str) -> ExchangeError {
        ExchangeError::NotSupported {
            exchange: self.id(),
            feature,
        }
    }
}
