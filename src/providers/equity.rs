//! Scrape-based equity price fetcher
//!
//! Prices come from the exchange's rendered quote page, reached through the
//! relay transport (the origin refuses direct cross-origin reads). The flow
//! per ticker: fresh cache hit, else join or lead a single flight that
//! resolves the ticker to a company id, fetches the quote page, and extracts
//! the value next to the configured label. Every failure along the way is
//! logged and degrades to an unpriced result; nothing is thrown past this
//! fetcher.

use crate::cache::TtlCache;
use crate::config::PriceServiceConfig;
use crate::error::ProviderError;
use crate::extract::{parse_displayed_price, FieldExtractor, LabeledValueExtractor};
use crate::flight::SingleFlight;
use crate::metrics::{MetricsCollector, ProviderMetrics};
use crate::resolver::{SearchResolver, SymbolResolver};
use crate::transport::Transport;
use crate::types::{PriceRecord, Ticker};
use std::sync::Arc;
use std::time::Instant;

/// Provider name used in records and logs
pub const EQUITY_PROVIDER_NAME: &str = "pse_edge";

/// Platform label stamped on equity records
pub const EQUITY_EXCHANGE: &str = "PSE";

struct Inner {
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn SymbolResolver>,
    extractor: Arc<dyn FieldExtractor>,
    cache: TtlCache,
    metrics: MetricsCollector,
    page_url: String,
    price_label: String,
    currency: String,
}

impl Inner {
    async fn fetch(&self, ticker: &Ticker) -> Result<PriceRecord, ProviderError> {
        let id = self
            .resolver
            .resolve(ticker)
            .await?
            .ok_or_else(|| ProviderError::resolution(format!("no exact match for {ticker}")))?;

        let url = format!("{}{}", self.page_url, id);
        let page = self.transport.get_text(&url).await?;

        let raw = self
            .extractor
            .extract(&page, &self.price_label)
            .ok_or_else(|| {
                ProviderError::extraction(format!(
                    "label {:?} missing or has no value",
                    self.price_label
                ))
            })?;

        let price = parse_displayed_price(&raw)
            .ok_or_else(|| ProviderError::extraction(format!("unparsable price {raw:?}")))?;

        Ok(PriceRecord::new(
            ticker.clone(),
            price,
            self.currency.clone(),
            EQUITY_EXCHANGE,
            EQUITY_PROVIDER_NAME,
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
                tracing::warn!(ticker = %ticker, provider = EQUITY_PROVIDER_NAME,
                    "Rate limited by provider; ticker left unpriced");
                None
            }
            Err(e) => {
                tracing::warn!(ticker = %ticker, provider = EQUITY_PROVIDER_NAME, error = %e,
                    "Equity fetch failed; ticker left unpriced");
                None
            }
        }
    }
}

/// Equity price provider with its own cache and in-flight registry
pub struct EquityProvider {
    inner: Arc<Inner>,
    flight: SingleFlight<Option<PriceRecord>>,
}

impl EquityProvider {
    /// Creates a provider over `transport` (expected to be relay-wrapped)
    pub fn new(config: &PriceServiceConfig, transport: Arc<dyn Transport>) -> Self {
        let resolver = Arc::new(SearchResolver::new(
            Arc::clone(&transport),
            config.equity_search_url.clone(),
        ));
        Self::with_parts(config, transport, resolver, Arc::new(LabeledValueExtractor::new()))
    }

    /// Creates a provider with an explicit resolver and extraction strategy
    pub fn with_parts(
        config: &PriceServiceConfig,
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn SymbolResolver>,
        extractor: Arc<dyn FieldExtractor>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                resolver,
                extractor,
                cache: TtlCache::new(config.price_ttl),
                metrics: MetricsCollector::new(EQUITY_PROVIDER_NAME),
                page_url: config.equity_page_url.clone(),
                price_label: config.equity_price_label.clone(),
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
