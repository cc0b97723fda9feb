//! HTTP transport.
//!
//! Adapters never talk to the network directly; they hand a
//! [`SignedRequest`] to an injected [`HttpTransport`]. Production code uses
//! [`ReqwestTransport`], tests use [`MockTransport`].

use crate::{ExchangeError, ExchangeResult, SignedRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tradegate_core::HttpMethod;
use tracing::debug;

/// Raw response: status, headers and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Response with a JSON body.
    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON; `None` for empty or non-JSON bodies.
    pub fn json(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }
}

/// Executes signed requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &SignedRequest) -> ExchangeResult<HttpResponse>;
}

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("tradegate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// [`HttpTransport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> ExchangeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &SignedRequest) -> ExchangeResult<HttpResponse> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;
        debug!("{} {} -> HTTP {}", request.method, request.url, status);

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

enum MockReply {
    Response(HttpResponse),
    Failure(String),
}

/// Recording transport with scripted replies, for testing.
///
/// Replies are served in the order they were pushed. When the script runs
/// dry the transport fails with [`ExchangeError::Transport`].
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<SignedRequest>>,
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, to widen race windows in concurrency tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn push_response(&self, response: HttpResponse) {
        self.replies
            .lock()
            .await
            .push_back(MockReply::Response(response));
    }

    pub async fn push_json(&self, status: u16, body: Value) {
        self.push_response(HttpResponse::json_body(status, &body))
            .await;
    }

    pub async fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(MockReply::Failure(message.into()));
    }

    /// Every request executed so far.
    pub async fn requests(&self) -> Vec<SignedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &SignedRequest) -> ExchangeResult<HttpResponse> {
        self.requests.lock().await.push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.replies.lock().await.pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Failure(message)) => Err(ExchangeError::Transport(message)),
            None => Err(ExchangeError::Transport(format!(
                "no scripted reply for {} {}",
                request.method, request.url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get(url: &str) -> SignedRequest {
        SignedRequest {
            url: url.to_string(),
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[test]
    fn test_http_response_json() {
        assert_eq!(HttpResponse::new(200, "").json(), None);
        assert_eq!(HttpResponse::new(502, "<html>").json(), None);
        assert_eq!(HttpResponse::new(200, r#"{"a":1}"#).json(), Some(json!({"a": 1})));
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(400, "").is_success());
    }

    #[tokio::test]
    async fn test_mock_transport_replays_in_order() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"n": 1})).await;
        mock.push_failure("connection reset").await;

        let first = mock.execute(&get("http://a")).await.unwrap();
        assert_eq!(first.json(), Some(json!({"n": 1})));

        let second = mock.execute(&get("http://b")).await;
        assert!(matches!(second, Err(ExchangeError::Transport(_))));

        let third = mock.execute(&get("http://c")).await;
        assert!(third.is_err());

        let urls: Vec<_> = mock.requests().await.into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["http://a", "http://b", "http://c"]);
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(TransportConfig::default()).is_ok());
    }
}
