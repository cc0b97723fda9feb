//! API credentials.

use crate::RequiredCredentials;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials supplied when an adapter is constructed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub secret: Option<String>,
    pub password: Option<String>,
    pub uid: Option<String>,
    /// Host (and port) of a locally served API gateway.
    pub ipaddr: Option<String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_ipaddr(mut self, ipaddr: impl Into<String>) -> Self {
        self.ipaddr = Some(ipaddr.into());
        self
    }

    /// Name of the first required credential that is absent or empty.
    pub fn first_missing(&self, required: &RequiredCredentials) -> Option<&'static str> {
        let checks = [
            (required.api_key, &self.api_key, "apiKey"),
            (required.secret, &self.secret, "secret"),
            (required.password, &self.password, "password"),
            (required.uid, &self.uid, "uid"),
            (required.ipaddr, &self.ipaddr, "ipaddr"),
        ];
        checks
            .into_iter()
            .find(|(needed, value, _)| *needed && value.as_deref().map_or(true, str::is_empty))
            .map(|(_, _, name)| name)
    }
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<set>"
    } else {
        "<unset>"
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &redact(&self.api_key))
            .field("secret", &redact(&self.secret))
            .field("password", &redact(&self.password))
            .field("uid", &redact(&self.uid))
            .field("ipaddr", &self.ipaddr)
            .finish()
    }
}
