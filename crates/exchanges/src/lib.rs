//! Exchange adapters.
//!
//! ## Architecture
//!
//! - `exchange` - the [`Exchange`] trait and the shared request pipeline
//! - `request` / `transport` / `nonce` - signing inputs and injected I/O
//! - `market_cache` - per-adapter market cache
//! - `kabus/`, `paymium/` - venue adapters

pub mod error;
pub mod exchange;
pub mod kabus;
pub mod market_cache;
pub mod nonce;
pub mod paymium;
pub mod request;
pub mod transport;

pub use error::*;
pub use exchange::*;
pub use kabus::Kabus;
pub use market_cache::*;
pub use nonce::*;
pub use paymium::Paymium;
pub use request::{ApiRequest, Params, SignedRequest};
pub use transport::*;

use std::sync::Arc;
use tradegate_core::{Credentials, ExchangeId};

/// Build the adapter for `id` over the given transport.
pub fn create_exchange(
    id: ExchangeId,
    credentials: Credentials,
    transport: Arc<dyn HttpTransport>,
) -> Box<dyn Exchange> {
    match id {
        ExchangeId::Kabus => Box::new(Kabus::new(credentials, transport)),
        ExchangeId::Paymium => Box::new(Paymium::new(credentials, transport)),
    }
}
