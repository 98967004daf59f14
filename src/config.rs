//! Runtime configuration for the price service
//!
//! Everything the fetchers depend on (TTL, endpoints, target currency,
//! timeout) is injected through this struct rather than read from globals,
//! so tests can run isolated service instances in parallel.

use crate::constants::{
    CRYPTO_MARKETS_URL, EQUITY_PAGE_URL, EQUITY_PRICE_LABEL, EQUITY_SEARCH_URL, PRICE_TTL_SECS,
    RELAY_URL, REQUEST_TIMEOUT_SECS, TARGET_CURRENCY,
};
use std::time::Duration;

/// Configuration for a [`crate::service::PriceService`] instance
#[derive(Debug, Clone)]
pub struct PriceServiceConfig {
    /// How long a cached price stays fresh
    pub price_ttl: Duration,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Currency code all prices are quoted in
    pub target_currency: String,

    /// Relay prefix for origins that block direct cross-origin reads
    pub relay_url: String,

    /// Equity symbol search endpoint (query appended)
    pub equity_search_url: String,

    /// Equity quote page endpoint (company id appended)
    pub equity_page_url: String,

    /// Label text next to the traded price on the equity quote page
    pub equity_price_label: String,

    /// Crypto markets endpoint
    pub crypto_markets_url: String,
}

impl Default for PriceServiceConfig {
    fn default() -> Self {
        Self {
            price_ttl: Duration::from_secs(PRICE_TTL_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            target_currency: TARGET_CURRENCY.to_string(),
            relay_url: RELAY_URL.to_string(),
            equity_search_url: EQUITY_SEARCH_URL.to_string(),
            equity_page_url: EQUITY_PAGE_URL.to_string(),
            equity_price_label: EQUITY_PRICE_LABEL.to_string(),
            crypto_markets_url: CRYPTO_MARKETS_URL.to_string(),
        }
    }
}

impl PriceServiceConfig {
    /// Overrides the cache TTL
    pub fn with_price_ttl(mut self, ttl: Duration) -> Self {
        self.price_ttl = ttl;
        self
    }

    /// Overrides the target currency
    pub fn with_target_currency(mut self, currency: impl Into<String>) -> Self {
        self.target_currency = currency.into();
        self
    }
}
