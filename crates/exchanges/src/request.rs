//! Unsigned and signed request shapes plus the path/query helpers used by
//! every adapter's `sign`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tradegate_core::fields::value_to_string;
use tradegate_core::{ApiTier, HttpMethod};

/// Request parameters. Keys are kept sorted, so query strings and JSON
/// bodies come out in a stable order.
pub type Params = Map<String, Value>;

/// A request before signing: which endpoint and with what parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path template relative to the API root, e.g. `data/{currency}/ticker`.
    pub path: String,
    pub tier: ApiTier,
    pub method: HttpMethod,
    /// Path placeholders and query/body parameters.
    pub params: Params,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(tier: ApiTier, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tier,
            method,
            params: Params::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn public(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::new(ApiTier::Public, method, path)
    }

    pub fn private(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::new(ApiTier::Private, method, path)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A request ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl SignedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Names of the `{placeholder}`s in a path template, in order.
pub fn extract_params(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}

/// Substitute `{placeholder}`s with parameter values. Unknown placeholders
/// are left untouched.
pub fn implode_params(template: &str, params: &Params) -> String {
    let mut out = template.to_string();
    for name in extract_params(template) {
        if let Some(value) = params.get(name).and_then(value_to_string) {
            out = out.replace(&format!("{{{}}}", name), &value);
        }
    }
    out
}

/// Parameters minus the given keys.
pub fn omit(params: &Params, keys: &[&str]) -> Params {
    params
        .iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// `application/x-www-form-urlencoded` rendering of the parameters.
pub fn urlencode(params: &Params) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        let text = match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => value_to_string(other).unwrap_or_else(|| other.to_string()),
        };
        serializer.append_pair(key, &text);
    }
    serializer.finish()
}
