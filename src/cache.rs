//! In-memory TTL cache for fetched prices
//!
//! One instance per provider, so an equity "AC" and a crypto "AC" never
//! share an entry. Freshness is computed at read time from the record's
//! `retrieved_at`; stale entries are not evicted, only skipped, and the
//! next successful fetch overwrites them. The key space is bounded by the
//! caller's portfolio size, so no memory-pressure eviction is needed.

use crate::types::{PriceRecord, Ticker};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// TTL-bounded price cache
pub struct TtlCache {
    ttl: Duration,
    entries: RwLock<HashMap<Ticker, PriceRecord>>,
}

impl TtlCache {
    /// Creates an empty cache with the given freshness window
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached record for `ticker` if it is still fresh
    pub async fn get(&self, ticker: &Ticker) -> Option<PriceRecord> {
        let entries = self.entries.read().await;
        entries
            .get(ticker)
            .filter(|record| record.is_fresh(self.ttl))
            .cloned()
    }

    /// Stores `record`, overwriting any prior entry for the ticker
    pub async fn put(&self, ticker: Ticker, record: PriceRecord) {
        let mut entries = self.entries.write().await;
        entries.insert(ticker, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(ticker: &str, price: f64) -> PriceRecord {
        PriceRecord::new(Ticker::new(ticker), price, "PHP", "Crypto", "test")
    }

    #[tokio::test]
    async fn fresh_entry_is_returned() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put(Ticker::new("BTC"), record("BTC", 100.0)).await;

        let hit = cache.get(&Ticker::new("BTC")).await.unwrap();
        assert_eq!(hit.price, 100.0);
    }

    #[tokio::test]
    async fn stale_entry_behaves_as_absent() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let mut stale = record("BTC", 100.0);
        stale.retrieved_at = Utc::now() - chrono::Duration::seconds(61);
        cache.put(Ticker::new("BTC"), stale).await;

        assert!(cache.get(&Ticker::new("BTC")).await.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_prior_entry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put(Ticker::new("BTC"), record("BTC", 100.0)).await;
        cache.put(Ticker::new("BTC"), record("BTC", 200.0)).await;

        let hit = cache.get(&Ticker::new("BTC")).await.unwrap();
        assert_eq!(hit.price, 200.0);
    }

    #[tokio::test]
    async fn keys_are_case_normalized() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put(Ticker::new("btc"), record("btc", 100.0)).await;

        assert!(cache.get(&Ticker::new("BTC")).await.is_some());
    }

    #[tokio::test]
    async fn missing_key_is_absent() {
        let cache = TtlCache::new(Duration::from_secs(60));
        assert!(cache.get(&Ticker::new("ETH")).await.is_none());
    }
}
