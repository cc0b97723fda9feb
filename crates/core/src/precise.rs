//! Exact decimal arithmetic on numeric strings.
//!
//! Exchanges send prices and volumes as text. Derived values such as quote
//! volume, trade cost and balance totals are computed on those strings through
//! [`Decimal`], so results like `"2.0" * "100"` come out as `"200"` with no
//! binary floating-point rounding.

use crate::{CoreError, CoreResult};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a numeric string into a [`Decimal`]. Scientific notation is accepted.
pub fn parse_decimal(s: &str) -> CoreResult<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| CoreError::InvalidDecimal(s.to_string()))
}

/// Canonical text of a decimal: trailing fractional zeros removed.
pub fn to_canonical_string(value: Decimal) -> String {
    value.normalize().to_string()
}

/// `a * b` on numeric strings. `None` when either operand is absent or invalid.
pub fn string_mul(a: Option<&str>, b: Option<&str>) -> Option<String> {
    let a = parse_decimal(a?).ok()?;
    let b = parse_decimal(b?).ok()?;
    a.checked_mul(b).map(to_canonical_string)
}

/// `a + b` on numeric strings. `None` when either operand is absent or invalid.
pub fn string_add(a: Option<&str>, b: Option<&str>) -> Option<String> {
    let a = parse_decimal(a?).ok()?;
    let b = parse_decimal(b?).ok()?;
    a.checked_add(b).map(to_canonical_string)
}

/// Convert an optional numeric string into a decimal at the API boundary.
pub fn parse_number(s: Option<&str>) -> Option<Decimal> {
    parse_decimal(s?).ok()
}
