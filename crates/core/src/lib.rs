//! Core data types shared by every exchange adapter.
//!
//! Adapters translate exchange-specific JSON into the normalized shapes
//! defined here (`Market`, `Ticker`, `Trade`, `OrderBook`, `Balances`, ...).
//! Numeric fields use [`rust_decimal::Decimal`] so values parsed from wire
//! strings stay exact.

pub mod balance;
pub mod credentials;
pub mod describe;
pub mod error;
pub mod exchange;
pub mod fields;
pub mod market;
pub mod ohlcv;
pub mod order;
pub mod order_book;
pub mod precise;
pub mod ticker;
pub mod trade;

pub use balance::*;
pub use credentials::*;
pub use describe::*;
pub use error::*;
pub use exchange::*;
pub use market::*;
pub use ohlcv::*;
pub use order::*;
pub use order_book::*;
pub use ticker::*;
pub use trade::*;

pub use rust_decimal::Decimal;
