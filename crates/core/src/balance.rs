//! Account balances.

use crate::{fields, precise};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Balance of one currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Available for trading.
    pub free: Option<Decimal>,
    /// Locked in open orders.
    pub used: Option<Decimal>,
    /// `free + used`.
    pub total: Option<Decimal>,
}

impl Account {
    /// Build from the numeric strings an exchange reports. The total is
    /// computed on the strings, so no precision is lost.
    pub fn from_strings(free: Option<&str>, used: Option<&str>) -> Self {
        let total = precise::string_add(free, used);
        Self {
            free: precise::parse_number(free),
            used: precise::parse_number(used),
            total: precise::parse_number(total.as_deref()),
        }
    }
}

/// Balances keyed by unified currency code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub accounts: BTreeMap<String, Account>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    /// Raw exchange payload.
    pub info: Value,
}

impl Balances {
    pub fn new(info: Value) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    /// Stamp the snapshot time.
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self.datetime = fields::iso8601(timestamp_ms);
        self
    }

    pub fn insert(&mut self, code: impl Into<String>, account: Account) {
        self.accounts.insert(code.into(), account);
    }

    pub fn get(&self, code: &str) -> Option<&Account> {
        self.accounts.get(code)
    }

    pub fn free(&self, code: &str) -> Option<Decimal> {
        self.get(code).and_then(|a| a.free)
    }

    pub fn used(&self, code: &str) -> Option<Decimal> {
        self.get(code).and_then(|a| a.used)
    }

    pub fn total(&self, code: &str) -> Option<Decimal> {
        self.get(code).and_then(|a| a.total)
    }

    /// Currency codes present in this snapshot.
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
