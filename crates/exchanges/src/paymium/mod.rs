//! Paymium adapter (BTC/EUR).

pub mod parse;
pub mod sign;

use crate::{
    ApiRequest, Exchange, ExchangeError, ExchangeResult, HttpResponse, HttpTransport,
    MarketCache, MillisNonce, NonceSource, SignedRequest,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tradegate_core::{
    ApiTier, Balances, Capabilities, Credentials, Endpoint, ExchangeDescriptor, ExchangeId,
    ExchangeUrls, HttpMethod, Market, MarketLimits, Order, OrderBook, OrderSide, OrderType,
    Precision, RequiredCredentials, Ticker, Trade, TradingFees,
};
use tracing::{info, warn};

const PUBLIC_GET: [&str; 6] = [
    "countries",
    "data/{currency}/ticker",
    "data/{currency}/trades",
    "data/{currency}/depth",
    "bitcoin_charts/{id}/trades",
    "bitcoin_charts/{id}/depth",
];

const PRIVATE_GET: [&str; 7] = [
    "user",
    "user/addresses",
    "user/addresses/{address}",
    "user/orders",
    "user/orders/{uuid}",
    "user/price_alerts",
    "merchant/get_payment/{uuid}",
];

const PRIVATE_POST: [&str; 7] = [
    "user/addresses",
    "user/orders",
    "user/withdrawals",
    "user/email_transfers",
    "user/payment_requests",
    "user/price_alerts",
    "merchant/create_payment",
];

const PRIVATE_DELETE: [&str; 3] = [
    "user/orders/{uuid}",
    "user/orders/{uuid}/cancel",
    "user/price_alerts/{id}",
];

fn fee() -> Decimal {
    Decimal::new(2, 3)
}

fn endpoints(tier: ApiTier, method: HttpMethod, paths: &[&'static str]) -> Vec<Endpoint> {
    paths
        .iter()
        .map(|path| Endpoint::new(tier, method, *path))
        .collect()
}

/// Static descriptor for paymium.
pub fn descriptor() -> ExchangeDescriptor {
    let mut api = endpoints(ApiTier::Public, HttpMethod::Get, &PUBLIC_GET);
    api.extend(endpoints(ApiTier::Private, HttpMethod::Get, &PRIVATE_GET));
    api.extend(endpoints(ApiTier::Private, HttpMethod::Post, &PRIVATE_POST));
    api.extend(endpoints(ApiTier::Private, HttpMethod::Delete, &PRIVATE_DELETE));

    ExchangeDescriptor {
        id: ExchangeId::Paymium,
        name: ExchangeId::Paymium.name(),
        countries: ExchangeId::Paymium.countries(),
        version: sign::API_VERSION,
        rate_limit_ms: 2000,
        timeframes: Vec::new(),
        urls: ExchangeUrls {
            logo: "https://user-images.githubusercontent.com/51840849/87153930-f0f02200-c2c0-11ea-9c0a-40337375ae89.jpg",
            api: sign::API_ROOT,
            www: "https://www.paymium.com",
            doc: vec![
                "https://github.com/Paymium/api-documentation",
                "https://www.paymium.com/page/developers",
            ],
            fees: Some("https://www.paymium.com/page/help/fees"),
            referral: Some("https://www.paymium.com/page/sign-up?referral=eDAzPoRQFMvaAB8sf-qj"),
        },
        has: Capabilities::new()
            .with("CORS", Some(true))
            .with("spot", Some(true))
            .with("margin", None)
            .with("swap", Some(false))
            .with("future", Some(false))
            .with("option", Some(false))
            .with("cancelOrder", Some(true))
            .with("createOrder", Some(true))
            .with("fetchBalance", Some(true))
            .with("fetchFundingHistory", Some(false))
            .with("fetchFundingRate", Some(false))
            .with("fetchFundingRateHistory", Some(false))
            .with("fetchFundingRates", Some(false))
            .with("fetchIndexOHLCV", Some(false))
            .with("fetchIsolatedPositions", Some(false))
            .with("fetchLeverage", Some(false))
            .with("fetchMarkOHLCV", Some(false))
            .with("fetchOrderBook", Some(true))
            .with("fetchPositions", Some(false))
            .with("fetchPositionsRisk", Some(false))
            .with("fetchPremiumIndexOHLCV", Some(false))
            .with("fetchTicker", Some(true))
            .with("fetchTrades", Some(true))
            .with("reduceMargin", Some(false))
            .with("setLeverage", Some(false))
            .with("setPositionMode", Some(false)),
        precision: Precision::default(),
        required_credentials: RequiredCredentials {
            api_key: true,
            secret: true,
            ..Default::default()
        },
        api,
        fees: TradingFees {
            maker: Some(fee()),
            taker: Some(fee()),
        },
    }
}

/// The single market paymium lists.
fn btc_eur_market() -> Market {
    Market {
        id: "eur".to_string(),
        symbol: "BTC/EUR".to_string(),
        base: "BTC".into(),
        quote: "EUR".into(),
        base_id: "btc".to_string(),
        quote_id: "eur".to_string(),
        spot: true,
        active: true,
        maker: Some(fee()),
        taker: Some(fee()),
        min_unit: None,
        limits: MarketLimits::default(),
        info: json!({
            "id": "eur",
            "symbol": "BTC/EUR",
            "base": "BTC",
            "quote": "EUR",
            "baseId": "btc",
            "quoteId": "eur",
            "type": "spot",
            "spot": true,
        }),
    }
}

/// `"limit"` -> `"LimitOrder"`.
fn order_type_name(order_type: OrderType) -> String {
    let name = order_type.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}Order", first.to_ascii_uppercase(), chars.as_str()),
        None => "Order".to_string(),
    }
}

/// paymium adapter.
pub struct Paymium {
    credentials: Credentials,
    transport: Arc<dyn HttpTransport>,
    nonce: Arc<dyn NonceSource>,
    markets: MarketCache,
}

impl Paymium {
    pub fn new(credentials: Credentials, transport: Arc<dyn HttpTransport>) -> Self {
        info!(
            "paymium: adapter created ({})",
            if credentials.api_key.is_some() { "authenticated" } else { "public only" }
        );
        Self {
            credentials,
            transport,
            nonce: Arc::new(MillisNonce::new()),
            markets: MarketCache::new(ExchangeId::Paymium),
        }
    }

    /// Replace the millisecond nonce source.
    pub fn with_nonce_source(mut self, nonce: Arc<dyn NonceSource>) -> Self {
        self.nonce = nonce;
        self
    }
}

#[async_trait]
impl Exchange for Paymium {
    fn id(&self) -> ExchangeId {
        ExchangeId::Paymium
    }

    fn describe(&self) -> ExchangeDescriptor {
        descriptor()
    }

    fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    fn market_cache(&self) -> &MarketCache {
        &self.markets
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        Ok(vec![btc_eur_market()])
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let market = self.market(symbol).await?;
        let request = ApiRequest::public(HttpMethod::Get, "data/{currency}/ticker")
            .param("currency", market.id.clone());
        let response = self.request(request).await?;
        Ok(parse::parse_ticker(&response, &market))
    }

    async fn fetch_order_book(&self, symbol: &str, limit: Option<usize>) -> ExchangeResult<OrderBook> {
        let market = self.market(symbol).await?;
        let request = ApiRequest::public(HttpMethod::Get, "data/{currency}/depth")
            .param("currency", market.id.clone());
        let response = self.request(request).await?;
        Ok(parse::parse_order_book(&response, &market.symbol).truncate(limit))
    }

    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Trade>> {
        let market = self.market(symbol).await?;
        let request = ApiRequest::public(HttpMethod::Get, "data/{currency}/trades")
            .param("currency", market.id.clone());
        let response = self.request(request).await?;
        let trades = parse::parse_trades(&response, &market)?;
        Ok(tradegate_core::filter_trades(trades, since, limit))
    }

    async fn fetch_balance(&self) -> ExchangeResult<Balances> {
        self.load_markets(false).await?;
        let response = self
            .request(ApiRequest::private(HttpMethod::Get, "user"))
            .await?;
        Ok(parse::parse_balance(&response, &self.markets.currencies()))
    }

    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: Decimal,
        price: Option<Decimal>,
    ) -> ExchangeResult<Order> {
        let market = self.market(symbol).await?;
        let mut request = ApiRequest::private(HttpMethod::Post, "user/orders")
            .param("type", order_type_name(order_type))
            .param("currency", market.id.clone())
            .param("direction", side.as_str())
            .param("amount", amount.to_string());
        if order_type.requires_price() {
            let price = price.ok_or_else(|| {
                ExchangeError::InvalidOrder(format!("{} order on {} needs a price", order_type, symbol))
            })?;
            request = request.param("price", price.to_string());
        }

        let response = self.request(request).await?;
        let id = response
            .get("uuid")
            .and_then(Value::as_str)
            .ok_or_else(|| ExchangeError::Parse(format!("paymium order without uuid: {}", response)))?
            .to_string();
        info!("paymium: {} {} {} {} accepted as {}", order_type, side, amount, symbol, id);
        Ok(Order::new(id, response))
    }

    async fn cancel_order(&self, id: &str, _symbol: Option<&str>) -> ExchangeResult<Value> {
        let request =
            ApiRequest::private(HttpMethod::Delete, "user/orders/{uuid}/cancel").param("uuid", id);
        self.request(request).await
    }

    async fn sign(&self, request: ApiRequest) -> ExchangeResult<SignedRequest> {
        sign::sign_request(request, &self.credentials, self.nonce.as_ref())
    }

    /// Failures come back as `{"errors": [...]}`.
    fn handle_errors(&self, _response: &HttpResponse, body: Option<&Value>) -> ExchangeResult<()> {
        match body {
            Some(body) if body.get("errors").is_some_and(|e| !e.is_null()) => {
                warn!("paymium: error envelope {}", body);
                Err(ExchangeError::exchange(ExchangeId::Paymium, body.to_string()))
            }
            _ => Ok(()),
        }
    }
}
