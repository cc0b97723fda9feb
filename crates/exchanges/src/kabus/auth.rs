//! kabu station token handling.
//!
//! The gateway issues a session token in exchange for the API password.
//! The token is fetched on the first signed request and reused for the
//! lifetime of the adapter.

use crate::{ExchangeError, ExchangeResult};
use serde_json::Value;
use std::future::Future;
use tokio::sync::Mutex;
use tradegate_core::fields::value_to_string;
use tradegate_core::ExchangeId;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenState {
    Unauthenticated,
    Authenticated(String),
}

/// Token state machine: `Unauthenticated -> Authenticated`.
///
/// The mutex is held while a fetch is in flight, so concurrent first
/// callers wait for the same token instead of requesting their own.
#[derive(Debug)]
pub struct TokenCache {
    state: Mutex<TokenState>,
}

impl TokenCache {
    /// Start authenticated when a token was supplied up front.
    pub fn new(preset: Option<String>) -> Self {
        let state = match preset {
            Some(token) if !token.is_empty() => TokenState::Authenticated(token),
            _ => TokenState::Unauthenticated,
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.lock().await, TokenState::Authenticated(_))
    }

    /// Cached token, or the result of `fetch` on first use. A failed fetch
    /// leaves the cache unauthenticated.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> ExchangeResult<String>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ExchangeResult<String>> + Send,
    {
        let mut state = self.state.lock().await;
        if let TokenState::Authenticated(token) = &*state {
            return Ok(token.clone());
        }
        let token = fetch().await?;
        *state = TokenState::Authenticated(token.clone());
        Ok(token)
    }
}

/// Extract the token from a `POST /token` reply. `ResultCode` 0 (string or
/// number) means success.
pub fn parse_token_response(response: &Value) -> ExchangeResult<String> {
    let code = response.get("ResultCode").and_then(value_to_string);
    match (code.as_deref(), response.get("Token").and_then(Value::as_str)) {
        (Some("0"), Some(token)) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(ExchangeError::exchange(
            ExchangeId::Kabus,
            format!("token request failed: {}", response),
        )),
    }
}
