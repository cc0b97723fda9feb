//! kabu station adapter (Japanese equities).
//!
//! The API is served by a gateway on the user's machine, addressed through
//! the `ipaddr` credential. Every call is authenticated with a session token
//! obtained from `POST /token`.

pub mod auth;
pub mod board;
pub mod ohlcv;

use crate::request::implode_params;
use crate::{
    ApiRequest, Exchange, ExchangeError, ExchangeResult, HttpResponse, HttpTransport, MarketCache,
    SignedRequest,
};
use async_trait::async_trait;
use auth::TokenCache;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tradegate_core::fields::safe_integer;
use tradegate_core::{
    ApiTier, Capabilities, Credentials, Endpoint, ExchangeDescriptor, ExchangeId, ExchangeUrls,
    HttpMethod, Market, MarketLimits, MinMax, Ohlcv, OrderBook, Precision, RequiredCredentials,
    Ticker, Trade, TradingFees,
};
use tracing::{info, warn};

const API_TEMPLATE: &str = "http://{ipaddr}/live/kabusapi";

/// Instrument codes (`<code>@<exchange>`) offered as markets.
pub const MARKET_CODES: [&str; 10] = [
    "8306@1",
    "4689@1",
    "6501@1",
    "3826@1",
    "5020@1",
    "3632@1",
    "5191@1",
    "6440@1",
    "8897@1",
    "167060018@24",
];

const TIMEFRAMES: [&str; 15] = [
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
];

const REQUIRED_CREDENTIALS: RequiredCredentials = RequiredCredentials {
    api_key: false,
    secret: false,
    password: false,
    uid: false,
    ipaddr: true,
};

/// Static descriptor for kabus.
pub fn descriptor() -> ExchangeDescriptor {
    ExchangeDescriptor {
        id: ExchangeId::Kabus,
        name: ExchangeId::Kabus.name(),
        countries: ExchangeId::Kabus.countries(),
        version: "v1",
        rate_limit_ms: 1000,
        timeframes: TIMEFRAMES.iter().map(|tf| (*tf, *tf)).collect(),
        urls: ExchangeUrls {
            logo: "https://pbs.twimg.com/profile_images/1476235905375813633/-jRNbwhv_400x400.jpg",
            api: API_TEMPLATE,
            www: "https://twitter.com/KabutoTheBot",
            doc: vec!["https://twitter.com/KabutoTheBot"],
            fees: None,
            referral: None,
        },
        has: Capabilities::new()
            .with("CORS", None)
            .with("spot", Some(true))
            .with("margin", None)
            .with("swap", None)
            .with("future", None)
            .with("option", None)
            .with("fetchOrderBook", Some(true))
            .with("fetchTicker", Some(true)),
        precision: Precision::default(),
        required_credentials: REQUIRED_CREDENTIALS,
        api: vec![
            Endpoint::new(ApiTier::Public, HttpMethod::Get, "board/{symbol}"),
            Endpoint::new(ApiTier::Public, HttpMethod::Get, ""),
            Endpoint::new(ApiTier::Public, HttpMethod::Post, "token"),
        ],
        fees: TradingFees {
            maker: Some(Decimal::new(1, 3)),
            taker: Some(Decimal::new(1, 3)),
        },
    }
}

fn market_for(code: &str) -> Market {
    let fee = Decimal::new(1, 3);
    let max = Decimal::from(100_000_000);
    Market {
        id: code.to_string(),
        symbol: format!("{}/JPY", code),
        base: "JPY".into(),
        quote: "JPY".into(),
        base_id: "JPY".to_string(),
        quote_id: "JPY".to_string(),
        spot: true,
        active: true,
        maker: Some(fee),
        taker: Some(fee),
        min_unit: Some(Decimal::from(100)),
        limits: MarketLimits {
            amount: MinMax::bounded(Decimal::from(100), max),
            price: MinMax::bounded(Decimal::from(100), max),
            cost: MinMax::bounded(Decimal::ZERO, max),
        },
        info: json!({ "code": code }),
    }
}

/// kabus adapter.
pub struct Kabus {
    credentials: Credentials,
    transport: Arc<dyn HttpTransport>,
    markets: MarketCache,
    token: TokenCache,
    ohlcv_fixture: PathBuf,
}

impl Kabus {
    /// A pre-supplied `api_key` is used as the session token as-is.
    pub fn new(credentials: Credentials, transport: Arc<dyn HttpTransport>) -> Self {
        info!(
            "kabus: adapter created for {}",
            credentials.ipaddr.as_deref().unwrap_or("<no host>")
        );
        let token = TokenCache::new(credentials.api_key.clone());
        Self {
            credentials,
            transport,
            markets: MarketCache::new(ExchangeId::Kabus),
            token,
            ohlcv_fixture: PathBuf::from(ohlcv::DEFAULT_FIXTURE),
        }
    }

    /// Read candles from `path` instead of `kabuto_price.json`.
    pub fn with_ohlcv_fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.ohlcv_fixture = path.into();
        self
    }

    fn check_credentials(&self) -> ExchangeResult<()> {
        match self.credentials.first_missing(&REQUIRED_CREDENTIALS) {
            Some(credential) => Err(ExchangeError::CredentialsMissing {
                exchange: ExchangeId::Kabus,
                credential,
            }),
            None => Ok(()),
        }
    }

    /// API root with the gateway host substituted.
    pub fn api_base(&self) -> ExchangeResult<String> {
        self.check_credentials()?;
        let mut params = crate::Params::new();
        params.insert(
            "ipaddr".to_string(),
            Value::from(self.credentials.ipaddr.clone().unwrap_or_default()),
        );
        Ok(implode_params(API_TEMPLATE, &params))
    }

    /// Exchange the API password for a session token. Bypasses `sign`.
    async fn fetch_token(&self) -> ExchangeResult<String> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let request = SignedRequest {
            url: format!("{}/token", self.api_base()?),
            method: HttpMethod::Post,
            headers,
            body: Some(json!({ "APIPassword": self.credentials.password }).to_string()),
        };

        let response = self.transport.execute(&request).await?;
        let body = response.json().ok_or_else(|| {
            ExchangeError::exchange(
                ExchangeId::Kabus,
                format!("token request failed: HTTP {} {}", response.status, response.body),
            )
        })?;
        let token = auth::parse_token_response(&body)?;
        info!("kabus: session token acquired");
        Ok(token)
    }

    /// Session token, fetched on first use.
    pub async fn token(&self) -> ExchangeResult<String> {
        self.token.get_or_fetch(|| self.fetch_token()).await
    }

    /// Raw board snapshot for a symbol.
    pub async fn fetch_board(&self, symbol: &str) -> ExchangeResult<Value> {
        let market = self.market(symbol).await?;
        let request = ApiRequest::public(HttpMethod::Get, "board/{symbol}")
            .param("symbol", market.id.clone());
        self.request(request).await
    }
}

#[async_trait]
impl Exchange for Kabus {
    fn id(&self) -> ExchangeId {
        ExchangeId::Kabus
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
        Ok(MARKET_CODES.iter().map(|code| market_for(code)).collect())
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let market = self.market(symbol).await?;
        let board = self.fetch_board(&market.id).await?;
        Ok(board::parse_ticker(&board, &market.symbol))
    }

    async fn fetch_order_book(&self, symbol: &str, limit: Option<usize>) -> ExchangeResult<OrderBook> {
        let market = self.market(symbol).await?;
        let board = self.fetch_board(&market.id).await?;
        Ok(board::parse_order_book(&board, &market.symbol, limit))
    }

    /// The gateway has no public trade feed.
    async fn fetch_trades(
        &self,
        symbol: &str,
        _since: Option<i64>,
        _limit: Option<usize>,
    ) -> ExchangeResult<Vec<Trade>> {
        self.market(symbol).await?;
        Ok(Vec::new())
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        _timeframe: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Ohlcv>> {
        let market = self.market(symbol).await.ok();
        let mut keys = vec![symbol];
        if let Some(market) = &market {
            keys.push(market.id.as_str());
            keys.push(market.symbol.as_str());
        }

        let mut candles = ohlcv::load_candles(&self.ohlcv_fixture, &keys).await?;
        if let Some(since) = since {
            candles.retain(|c| c.timestamp >= since);
        }
        if let Some(limit) = limit {
            candles.truncate(limit);
        }
        Ok(candles)
    }

    async fn sign(&self, request: ApiRequest) -> ExchangeResult<SignedRequest> {
        let base = self.api_base()?;
        let token = self.token().await?;

        let mut headers = request.headers;
        headers.insert("X-API-KEY".to_string(), token);
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Ok(SignedRequest {
            url: format!("{}/{}", base, implode_params(&request.path, &request.params)),
            method: request.method,
            headers,
            body: request.body,
        })
    }

    /// The gateway reports failures as `{"Code": <non-zero>, "Message": ..}`.
    fn handle_errors(&self, _response: &HttpResponse, body: Option<&Value>) -> ExchangeResult<()> {
        let Some(body) = body else {
            return Ok(());
        };
        match safe_integer(body, "Code") {
            Some(code) if code != 0 => {
                warn!("kabus: error envelope {}", body);
                Err(ExchangeError::exchange(ExchangeId::Kabus, body.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockTransport;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tradegate_core::PriceLevel;

    fn credentials() -> Credentials {
        Credentials::new()
            .with_ipaddr("localhost:18080")
            .with_password("pw")
    }

    fn kabus(transport: Arc<MockTransport>) -> Kabus {
        Kabus::new(credentials(), transport)
    }

    #[tokio::test]
    async fn test_markets_limits_are_ordered() {
        let exchange = kabus(Arc::new(MockTransport::new()));
        let markets = exchange.fetch_markets().await.unwrap();
        assert_eq!(markets.len(), MARKET_CODES.len());
        for market in &markets {
            assert!(market.limits.is_consistent(), "{}", market.symbol);
            assert_eq!(market.symbol, format!("{}/JPY", market.id));
            assert_eq!(market.quote, "JPY");
            assert_eq!(market.maker, Some(Decimal::new(1, 3)));
            assert_eq!(market.min_unit, Some(Decimal::from(100)));
        }
        assert_eq!(markets[9].symbol, "167060018@24/JPY");
    }

    #[tokio::test]
    async fn test_fetch_markets_is_idempotent() {
        let exchange = kabus(Arc::new(MockTransport::new()));
        let first = exchange.fetch_markets().await.unwrap();
        let second = exchange.fetch_markets().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_sign_fetches_token_once() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"ResultCode": "0", "Token": "abc"}))
            .await;
        let exchange = kabus(Arc::clone(&transport));

        let request = ApiRequest::public(HttpMethod::Get, "board/{symbol}").param("symbol", "8306@1");
        let signed = exchange.sign(request.clone()).await.unwrap();
        assert_eq!(signed.url, "http://localhost:18080/live/kabusapi/board/8306@1");
        assert_eq!(signed.header("X-API-KEY"), Some("abc"));
        assert_eq!(signed.header("Content-Type"), Some("application/json"));

        exchange.sign(request).await.unwrap();

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://localhost:18080/live/kabusapi/token");
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"APIPassword":"pw"}"#));
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_token_request() {
        let transport = Arc::new(MockTransport::new().with_latency(Duration::from_millis(20)));
        transport
            .push_json(200, json!({"ResultCode": 0, "Token": "abc"}))
            .await;
        let exchange = Arc::new(kabus(Arc::clone(&transport)));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let exchange = Arc::clone(&exchange);
                tokio::spawn(async move { exchange.token().await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "abc");
        }
        assert_eq!(transport.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_token_failure_is_exchange_error() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"ResultCode": "1"})).await;
        let exchange = kabus(transport);
        let err = exchange
            .sign(ApiRequest::public(HttpMethod::Get, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Exchange { exchange: ExchangeId::Kabus, .. }));
    }

    #[tokio::test]
    async fn test_missing_ipaddr() {
        let transport = Arc::new(MockTransport::new());
        let exchange = Kabus::new(Credentials::new().with_password("pw"), transport.clone());
        let err = exchange
            .sign(ApiRequest::public(HttpMethod::Get, ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::CredentialsMissing { credential: "ipaddr", .. }
        ));
        assert_eq!(transport.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_preset_api_key_is_used_as_token() {
        let transport = Arc::new(MockTransport::new());
        let exchange = Kabus::new(credentials().with_api_key("preset"), transport.clone());
        let signed = exchange
            .sign(ApiRequest::public(HttpMethod::Get, ""))
            .await
            .unwrap();
        assert_eq!(signed.header("X-API-KEY"), Some("preset"));
        assert_eq!(signed.url, "http://localhost:18080/live/kabusapi/");
        assert_eq!(transport.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_order_book_by_bare_code() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"ResultCode": "0", "Token": "abc"}))
            .await;
        transport
            .push_json(
                200,
                json!({
                    "Symbol": "8306",
                    "Buy1": {"Price": 100, "Qty": 5},
                    "Sell1": {"Price": 100, "Qty": 5},
                }),
            )
            .await;
        let exchange = kabus(Arc::clone(&transport));

        let book = exchange.fetch_order_book("8306@1", None).await.unwrap();
        let level = PriceLevel::new(Decimal::from(100), Decimal::from(5));
        assert_eq!(book.symbol, "8306@1/JPY");
        assert_eq!(book.bids, vec![level]);
        assert_eq!(book.asks, vec![level]);

        let requests = transport.requests().await;
        assert_eq!(requests[1].url, "http://localhost:18080/live/kabusapi/board/8306@1");
    }

    #[tokio::test]
    async fn test_fetch_ticker_parses_board() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"ResultCode": "0", "Token": "abc"}))
            .await;
        transport
            .push_json(200, json!({"CurrentPrice": 2408, "Buy1": {"Price": 2407, "Qty": 100}}))
            .await;
        let exchange = kabus(transport);

        let ticker = exchange.fetch_ticker("8897@1/JPY").await.unwrap();
        assert_eq!(ticker.symbol, "8897@1/JPY");
        assert_eq!(ticker.last, Some(Decimal::from(2408)));
        assert_eq!(ticker.bid, Some(Decimal::from(2407)));
    }

    #[tokio::test]
    async fn test_gateway_error_envelope() {
        let transport = Arc::new(MockTransport::new());
        transport
            .push_json(200, json!({"ResultCode": "0", "Token": "abc"}))
            .await;
        transport
            .push_json(400, json!({"Code": 4002001, "Message": "unknown symbol"}))
            .await;
        let exchange = kabus(transport);

        let err = exchange.fetch_board("8306@1").await.unwrap_err();
        match err {
            ExchangeError::Exchange { exchange, message } => {
                assert_eq!(exchange, ExchangeId::Kabus);
                assert!(message.contains("4002001"));
            }
            other => panic!("expected exchange error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let exchange = kabus(Arc::new(MockTransport::new()));
        assert!(matches!(
            exchange.fetch_ticker("0000@1").await,
            Err(ExchangeError::BadSymbol(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_trades_is_empty() {
        let exchange = kabus(Arc::new(MockTransport::new()));
        assert!(exchange.fetch_trades("8306@1", None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_ohlcv_from_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kabuto_price.json");
        let fixture = json!({
            "8306@1": [
                [1000, 1, 2, 0.5, 1.5, 10, "x"],
                [2000, 1.5, 3, 1, 2, 20, "y"],
                [3000, 2, 4, 2, 3, 30, "z"],
            ]
        });
        std::fs::write(&path, fixture.to_string()).unwrap();
        let exchange = kabus(Arc::new(MockTransport::new())).with_ohlcv_fixture(&path);

        let all = exchange.fetch_ohlcv("8306@1", "1m", None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].low.to_string(), "0.5");

        let some = exchange
            .fetch_ohlcv("8306@1/JPY", "1m", Some(2000), Some(1))
            .await
            .unwrap();
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].timestamp, 2000);

        assert!(matches!(
            exchange.fetch_ohlcv("6501@1", "1m", None, None).await,
            Err(ExchangeError::BadSymbol(_))
        ));
    }

    #[test]
    fn test_descriptor() {
        let d = descriptor();
        assert_eq!(d.id, ExchangeId::Kabus);
        assert_eq!(d.rate_limit_ms, 1000);
        assert_eq!(d.timeframes.len(), 15);
        assert_eq!(d.timeframe("1M"), Some("1M"));
        assert!(d.has.supports("fetchTicker"));
        assert_eq!(d.has.get("margin"), None);
        assert!(d.required_credentials.ipaddr);
        assert!(!d.required_credentials.api_key);
        assert!(d.endpoint(ApiTier::Public, HttpMethod::Post, "token").is_some());
    }
}
