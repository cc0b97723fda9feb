//! Paymium request signing.
//!
//! Private calls carry `Api-Key`, `Api-Nonce` and `Api-Signature`, where the
//! signature is the hex HMAC-SHA256 of `nonce + url [+ body | + query]`.

use crate::request::{extract_params, implode_params, omit, urlencode};
use crate::{ApiRequest, ExchangeError, ExchangeResult, NonceSource, SignedRequest};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tradegate_core::{ApiTier, Credentials, ExchangeId, HttpMethod};

type HmacSha256 = Hmac<Sha256>;

pub const API_ROOT: &str = "https://paymium.com/api";
pub const API_VERSION: &str = "v1";

/// Hex HMAC-SHA256 of `message` keyed by `secret`.
pub fn hmac_sha256_hex(secret: &str, message: &str) -> ExchangeResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::exchange(ExchangeId::Paymium, format!("invalid secret: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn required<'a>(value: &'a Option<String>, credential: &'static str) -> ExchangeResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ExchangeError::CredentialsMissing {
            exchange: ExchangeId::Paymium,
            credential,
        })
}

pub fn sign_request(
    request: ApiRequest,
    credentials: &Credentials,
    nonce: &dyn NonceSource,
) -> ExchangeResult<SignedRequest> {
    let mut url = format!(
        "{}/{}/{}",
        API_ROOT,
        API_VERSION,
        implode_params(&request.path, &request.params)
    );
    let query = omit(&request.params, &extract_params(&request.path));
    let mut headers = request.headers;
    let mut body = request.body;

    match request.tier {
        ApiTier::Public => {
            if !query.is_empty() {
                url.push('?');
                url.push_str(&urlencode(&query));
            }
        }
        ApiTier::Private => {
            let api_key = required(&credentials.api_key, "apiKey")?;
            let secret = required(&credentials.secret, "secret")?;
            let nonce = nonce.next_nonce().to_string();
            let mut auth = format!("{}{}", nonce, url);

            if request.method == HttpMethod::Post {
                if !query.is_empty() {
                    let json = serde_json::to_string(&query)?;
                    auth.push_str(&json);
                    body = Some(json);
                    headers.insert("Content-Type".to_string(), "application/json".to_string());
                }
            } else if !query.is_empty() {
                let query_string = urlencode(&query);
                auth.push_str(&query_string);
                url.push('?');
                url.push_str(&query_string);
            }

            headers.insert("Api-Key".to_string(), api_key.to_string());
            headers.insert("Api-Nonce".to_string(), nonce);
            headers.insert("Api-Signature".to_string(), hmac_sha256_hex(secret, &auth)?);
        }
    }

    Ok(SignedRequest {
        url,
        method: request.method,
        headers,
        body,
    })
}
