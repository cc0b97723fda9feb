//! Nonce sources for request signing.

use std::sync::atomic::{AtomicU64, Ordering};

/// Produces nonces for signed requests. Each call must return a value
/// strictly greater than the previous one.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> u64;
}

/// Milliseconds since the Unix epoch, bumped by one when two calls land in
/// the same millisecond.
#[derive(Debug, Default)]
pub struct MillisNonce {
    last: AtomicU64,
}

impl MillisNonce {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NonceSource for MillisNonce {
    fn next_nonce(&self) -> u64 {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Counter starting at a fixed value. Deterministic, for tests and replays.
#[derive(Debug)]
pub struct CounterNonce {
    next: AtomicU64,
}

impl CounterNonce {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl NonceSource for CounterNonce {
    fn next_nonce(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
