//! Direct-API cryptocurrency price fetcher
//!
//! Queries the markets endpoint filtered by symbol in the target currency
//! (no identifier resolution step). From the returned list the element whose
//! symbol equals the ticker case-insensitively is preferred, else the first.
//! A missing or null price field is unpriced, never zero. Same cache and
//! single-flight discipline as the equity fetcher, with fully independent
//! state.

use crate::cache::TtlCache;
use crate::config::PriceServiceConfig;
use crate::error::ProviderError;
use crate::flight::SingleFlight;
use crate::metrics::{MetricsCollector, ProviderMetrics};
use crate::transport::Transport;
use crate::types::{PriceRecord, Ticker};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

/// Provider name used in records and logs
pub const CRYPTO_PROVIDER_NAME: &str = "coingecko";

/// Platform label stamped on crypto records
pub const CRYPTO_EXCHANGE: &str = "Crypto";

/// One row of the markets endpoint response
#[derive(Debug, Deserialize)]
struct MarketEntry {
    symbol: String,
    current_price: Option<f64>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    cache: TtlCache,
    metrics: MetricsCollector,
    markets_url: String,
    currency: String,
}

impl Inner {
    fn markets_query(&self, ticker: &Ticker) -> String {
        format!(
            "{}?vs_currency={}&symbols={}&per_page=10",
            self.markets_url,
            self.currency.to_lowercase(),
            urlencoding::encode(&ticker.to_lowercase())
        )
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<PriceRecord, ProviderError> {
        let body = self.transport.get_text(&self.markets_query(ticker)).await?;

        let entries: Vec<MarketEntry> = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("markets endpoint returned malformed JSON: {e}"))
        })?;

        let entry = entries
            .iter()
            .find(|entry| entry.symbol.eq_ignore_ascii_case(ticker.as_str()))
            .or_else(|| entries.first())
            .ok_or_else(|| {
                ProviderError::extraction(format!("no market entry for {ticker}"))
            })?;

        let price = entry
            .current_price
            .filter(|price| price.is_finite())
            .ok_or_else(|| {
                ProviderError::extraction(format!("market entry for {ticker} has no price"))
            })?;

        Ok(PriceRecord::new(
            ticker.clone(),
            price,
            self.currency.clone(),
            CRYPTO_EXCHANGE,
            CRYPTO_PROVIDER_NAME,
        ))
    }

    async fn fetch_and_store(self: Arc<Self>, ticker: Ticker) -> Option<PriceRecord> {
        let start = Instant::now();
        let outcome = self.fetch(&ticker).await;
        self.metrics.record_fetch(start.elapsed(), outcome.is_ok()).await;

        match outcome {
            Ok(record) => {
                self.cache.put(ticker, record.clone()).await;
                Some(record)
            }
            Err(ProviderError::RateLimited) => {
                tracing::warn!(ticker = %ticker, provider = CRYPTO_PROVIDER_NAME,
                    "Rate limited by provider; ticker left unpriced");
                None
            }
            Err(e) => {
                tracing::warn!(ticker = %ticker, provider = CRYPTO_PROVIDER_NAME, error = %e,
                    "Crypto fetch failed; ticker left unpriced");
                None
            }
        }
    }
}

/// Cryptocurrency price provider with its own cache and in-flight registry
pub struct CryptoProvider {
    inner: Arc<Inner>,
    flight: SingleFlight<Option<PriceRecord>>,
}

impl CryptoProvider {
    /// Creates a provider querying the configured markets endpoint
    pub fn new(config: &PriceServiceConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                cache: TtlCache::new(config.price_ttl),
                metrics: MetricsCollector::new(CRYPTO_PROVIDER_NAME),
                markets_url: config.crypto_markets_url.clone(),
                currency: config.target_currency.clone(),
            }),
            flight: SingleFlight::new(),
        }
    }

    /// Fetches the current price for `ticker`, or `None` when unpriceable
    pub async fn fetch_price(&self, ticker: &Ticker) -> Option<PriceRecord> {
        if let Some(hit) = self.inner.cache.get(ticker).await {
            self.inner.metrics.record_cache_hit();
            return Some(hit);
        }

        let inner = Arc::clone(&self.inner);
        let key = ticker.clone();
        self.flight
            .run(ticker, move || inner.fetch_and_store(key))
            .await
    }

    /// Current fetch metrics for this provider
    pub async fn metrics(&self) -> ProviderMetrics {
        self.inner.metrics.snapshot(self.flight.waits_joined()).await
    }
}
