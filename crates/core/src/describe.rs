//! Static exchange descriptors.
//!
//! A descriptor is everything an adapter knows about its venue without
//! talking to it: endpoints, capability flags, credential requirements and
//! the fee schedule.

use crate::ExchangeId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Access tier of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiTier {
    Public,
    Private,
}

impl ApiTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiTier::Public => "public",
            ApiTier::Private => "private",
        }
    }
}

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the endpoint table. `path` may hold `{placeholder}`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub tier: ApiTier,
    pub method: HttpMethod,
    pub path: &'static str,
}

impl Endpoint {
    pub const fn new(tier: ApiTier, method: HttpMethod, path: &'static str) -> Self {
        Self { tier, method, path }
    }
}

/// Links published for a venue. `api` is a template and may contain
/// placeholders such as `{ipaddr}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExchangeUrls {
    pub logo: &'static str,
    pub api: &'static str,
    pub www: &'static str,
    pub doc: Vec<&'static str>,
    pub fees: Option<&'static str>,
    pub referral: Option<&'static str>,
}

/// Capability flags. `Some(true)`: supported, `Some(false)`: not supported,
/// `None`: unknown / emulated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities(BTreeMap<&'static str, Option<bool>>);

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, feature: &'static str, flag: Option<bool>) -> Self {
        self.0.insert(feature, flag);
        self
    }

    /// Flag for a feature; `None` when unknown or never declared.
    pub fn get(&self, feature: &str) -> Option<bool> {
        self.0.get(feature).copied().flatten()
    }

    /// True only for features declared `Some(true)`.
    pub fn supports(&self, feature: &str) -> bool {
        self.get(feature) == Some(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<bool>)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Which credentials must be present before signing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequiredCredentials {
    pub api_key: bool,
    pub secret: bool,
    pub password: bool,
    pub uid: bool,
    pub ipaddr: bool,
}

/// Price/amount precision, when the venue publishes one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Precision {
    pub amount: Option<Decimal>,
    pub price: Option<Decimal>,
}

/// Default trading fee rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TradingFees {
    pub maker: Option<Decimal>,
    pub taker: Option<Decimal>,
}

/// Full static description of an exchange adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeDescriptor {
    pub id: ExchangeId,
    pub name: &'static str,
    pub countries: &'static [&'static str],
    pub version: &'static str,
    /// Minimum spacing between requests advertised by the venue.
    pub rate_limit_ms: u64,
    /// Unified timeframe -> exchange timeframe.
    pub timeframes: Vec<(&'static str, &'static str)>,
    pub urls: ExchangeUrls,
    pub has: Capabilities,
    pub precision: Precision,
    pub required_credentials: RequiredCredentials,
    pub api: Vec<Endpoint>,
    pub fees: TradingFees,
}

impl ExchangeDescriptor {
    /// Look up an endpoint by tier, verb and path template.
    pub fn endpoint(&self, tier: ApiTier, method: HttpMethod, path: &str) -> Option<&Endpoint> {
        self.api
            .iter()
            .find(|e| e.tier == tier && e.method == method && e.path == path)
    }

    /// Endpoints of one tier.
    pub fn endpoints(&self, tier: ApiTier) -> impl Iterator<Item = &Endpoint> {
        self.api.iter().filter(move |e| e.tier == tier)
    }

    /// Exchange-side name of a unified timeframe.
    pub fn timeframe(&self, unified: &str) -> Option<&'static str> {
        self.timeframes
            .iter()
            .find(|(u, _)| *u == unified)
            .map(|(_, ex)| *ex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ExchangeDescriptor {
        ExchangeDescriptor {
            id: ExchangeId::Paymium,
            name: "Paymium",
            countries: &["FR"],
            version: "v1",
            rate_limit_ms: 2000,
            timeframes: vec![("1m", "1m")],
            urls: ExchangeUrls::default(),
            has: Capabilities::new()
                .with("fetchTicker", Some(true))
                .with("margin", None)
                .with("swap", Some(false)),
            precision: Precision::default(),
            required_credentials: RequiredCredentials::default(),
            api: vec![
                Endpoint::new(ApiTier::Public, HttpMethod::Get, "data/{currency}/ticker"),
                Endpoint::new(ApiTier::Private, HttpMethod::Post, "user/orders"),
            ],
            fees: TradingFees::default(),
        }
    }

    #[test]
    fn test_capabilities_tri_state() {
        let d = descriptor();
        assert!(d.has.supports("fetchTicker"));
        assert_eq!(d.has.get("margin"), None);
        assert_eq!(d.has.get("swap"), Some(false));
        assert!(!d.has.supports("swap"));
        assert!(!d.has.supports("undeclared"));
    }

    #[test]
    fn test_endpoint_lookup() {
        let d = descriptor();
        assert!(d
            .endpoint(ApiTier::Private, HttpMethod::Post, "user/orders")
            .is_some());
        assert!(d
            .endpoint(ApiTier::Public, HttpMethod::Post, "user/orders")
            .is_none());
        assert_eq!(d.endpoints(ApiTier::Public).count(), 1);
    }

    #[test]
    fn test_timeframe_lookup() {
        let d = descriptor();
        assert_eq!(d.timeframe("1m"), Some("1m"));
        assert_eq!(d.timeframe("1y"), None);
    }

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
        assert_eq!(HttpMethod::Get.to_string(), "GET");
    }
}
