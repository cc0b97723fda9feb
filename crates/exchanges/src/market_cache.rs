//! Per-adapter market cache.
//!
//! Markets are indexed by unified symbol and by exchange id. Loading is
//! serialized by an async mutex so concurrent first callers trigger a single
//! `fetch_markets`.

use crate::{ExchangeError, ExchangeResult};
use dashmap::DashMap;
use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tradegate_core::{Currency, ExchangeId, Market};
use tracing::{debug, info};

pub struct MarketCache {
    exchange: ExchangeId,
    by_symbol: DashMap<String, Arc<Market>>,
    by_id: DashMap<String, Arc<Market>>,
    loaded: AtomicBool,
    load_lock: Mutex<()>,
}

impl MarketCache {
    pub fn new(exchange: ExchangeId) -> Self {
        Self {
            exchange,
            by_symbol: DashMap::new(),
            by_id: DashMap::new(),
            loaded: AtomicBool::new(false),
            load_lock: Mutex::new(()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Return the cached markets, running `loader` first when the cache is
    /// empty or `reload` is set.
    pub async fn get_or_load<F, Fut>(&self, reload: bool, loader: F) -> ExchangeResult<Vec<Arc<Market>>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ExchangeResult<Vec<Market>>> + Send,
    {
        if self.is_loaded() && !reload {
            return Ok(self.markets());
        }

        let _guard = self.load_lock.lock().await;
        if self.is_loaded() && !reload {
            debug!("{}: markets loaded by a concurrent caller", self.exchange);
            return Ok(self.markets());
        }

        let markets = loader().await?;
        self.replace(markets);
        info!("{}: loaded {} markets", self.exchange, self.by_symbol.len());
        Ok(self.markets())
    }

    /// Install a fresh market list. New entries are inserted before stale
    /// ones are dropped, so lookups never observe an empty cache mid-reload.
    fn replace(&self, markets: Vec<Market>) {
        let mut symbols = HashSet::with_capacity(markets.len());
        let mut ids = HashSet::with_capacity(markets.len());
        for market in markets {
            let market = Arc::new(market);
            symbols.insert(market.symbol.clone());
            ids.insert(market.id.clone());
            self.by_id.insert(market.id.clone(), Arc::clone(&market));
            self.by_symbol.insert(market.symbol.clone(), market);
        }
        self.by_symbol.retain(|symbol, _| symbols.contains(symbol));
        self.by_id.retain(|id, _| ids.contains(id));
        self.loaded.store(true, Ordering::Release);
    }

    /// Cached markets ordered by symbol.
    pub fn markets(&self) -> Vec<Arc<Market>> {
        let mut markets: Vec<_> = self.by_symbol.iter().map(|e| Arc::clone(e.value())).collect();
        markets.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        markets
    }

    /// Resolve a unified symbol, falling back to the exchange market id.
    pub fn market(&self, symbol: &str) -> ExchangeResult<Arc<Market>> {
        self.by_symbol
            .get(symbol)
            .or_else(|| self.by_id.get(symbol))
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| ExchangeError::BadSymbol(format!("{} {}", self.exchange, symbol)))
    }

    /// Currencies referenced by the cached markets, deduplicated.
    pub fn currencies(&self) -> Vec<Currency> {
        self.by_symbol
            .iter()
            .flat_map(|e| e.value().currencies())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::atomic::AtomicUsize;
    use tradegate_core::MarketLimits;

    fn market(id: &str, symbol: &str, base: &str, quote: &str) -> Market {
        Market {
            id: id.to_string(),
            symbol: symbol.to_string(),
            base: base.into(),
            quote: quote.into(),
            base_id: base.to_lowercase(),
            quote_id: quote.to_lowercase(),
            spot: true,
            active: true,
            maker: None,
            taker: None,
            min_unit: None,
            limits: MarketLimits::default(),
            info: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_load_once_then_cached() {
        let cache = MarketCache::new(ExchangeId::Paymium);
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let markets = cache
                .get_or_load(false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![market("eur", "BTC/EUR", "BTC", "EUR")])
                })
                .await
                .unwrap();
            assert_eq!(markets.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache
            .get_or_load(true, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![market("eur", "BTC/EUR", "BTC", "EUR")])
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_load_runs_once() {
        let cache = Arc::new(MarketCache::new(ExchangeId::Kabus));
        let calls = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_load(false, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                            Ok(vec![market("8306@1", "8306@1/JPY", "JPY", "JPY")])
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_cache_empty() {
        let cache = MarketCache::new(ExchangeId::Paymium);
        let result = cache
            .get_or_load(false, || async { Err(ExchangeError::Transport("down".into())) })
            .await;
        assert!(result.is_err());
        assert!(!cache.is_loaded());
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reload_keeps_lookups_resolvable() {
        let cache = Arc::new(MarketCache::new(ExchangeId::Paymium));
        cache
            .get_or_load(false, || async { Ok(vec![market("eur", "BTC/EUR", "BTC", "EUR")]) })
            .await
            .unwrap();

        let reader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                for _ in 0..200 {
                    assert_eq!(cache.market("BTC/EUR").unwrap().id, "eur");
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..20 {
            cache
                .get_or_load(true, || async {
                    tokio::task::yield_now().await;
                    Ok(vec![market("eur", "BTC/EUR", "BTC", "EUR")])
                })
                .await
                .unwrap();
        }
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn test_reload_drops_stale_markets() {
        let cache = MarketCache::new(ExchangeId::Kabus);
        cache
            .get_or_load(false, || async {
                Ok(vec![
                    market("8306@1", "8306@1/JPY", "8306@1", "JPY"),
                    market("9433@1", "9433@1/JPY", "9433@1", "JPY"),
                ])
            })
            .await
            .unwrap();
        cache
            .get_or_load(true, || async { Ok(vec![market("8306@1", "8306@1/JPY", "8306@1", "JPY")]) })
            .await
            .unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.market("8306@1").is_ok());
        assert!(matches!(
            cache.market("9433@1"),
            Err(ExchangeError::BadSymbol(_))
        ));
        assert!(cache.market("9433@1/JPY").is_err());
    }

    #[tokio::test]
    async fn test_market_lookup_by_symbol_and_id() {
        let cache = MarketCache::new(ExchangeId::Paymium);
        cache
            .get_or_load(false, || async { Ok(vec![market("eur", "BTC/EUR", "BTC", "EUR")]) })
            .await
            .unwrap();

        assert_eq!(cache.market("BTC/EUR").unwrap().id, "eur");
        assert_eq!(cache.market("eur").unwrap().symbol, "BTC/EUR");
        assert!(cache.market("btc").is_err());
        assert!(matches!(
            cache.market("ETH/EUR"),
            Err(ExchangeError::BadSymbol(_))
        ));

        let codes: Vec<_> = cache.currencies().into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["BTC", "EUR"]);
    }
}
