//! Exchange identifiers.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchange identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    /// kabu station REST API (Japanese equities), served by a local gateway.
    Kabus,
    /// Paymium (BTC/EUR).
    Paymium,
}

impl ExchangeId {
    /// Lowercase id used in error messages and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            ExchangeId::Kabus => "kabus",
            ExchangeId::Paymium => "paymium",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ExchangeId::Kabus => "Kabus",
            ExchangeId::Paymium => "Paymium",
        }
    }

    /// ISO country codes where the exchange operates.
    pub fn countries(self) -> &'static [&'static str] {
        match self {
            ExchangeId::Kabus => &["JP"],
            ExchangeId::Paymium => &["FR", "EU"],
        }
    }

    pub fn all() -> &'static [ExchangeId] {
        &[ExchangeId::Kabus, ExchangeId::Paymium]
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kabus" => Ok(ExchangeId::Kabus),
            "paymium" => Ok(ExchangeId::Paymium),
            other => Err(CoreError::UnknownExchange(other.to_string())),
        }
    }
}
