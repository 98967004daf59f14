//! Types for the asset price aggregation service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A normalized ticker symbol (e.g. "BTC", "AC").
///
/// Tickers are case-insensitive on input and canonicalized to uppercase at
/// construction. The same `Ticker` value is used as the key for the price
/// cache, the in-flight registry, and the identifier map, so normalization
/// happens in exactly one place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a ticker, uppercasing and trimming the input
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    /// The canonical (uppercase) symbol
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form, for providers that key by lowercase symbol
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl From<String> for Ticker {
    fn from(symbol: String) -> Self {
        Self::new(symbol)
    }
}

/// Asset class declared by the caller, drives provider routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Exchange-listed stock, priced by scraping the exchange's quote page
    Equity,
    /// Cryptocurrency, priced from a public markets API
    Crypto,
    /// Anything else; never priced, never triggers network activity
    Other,
}

/// A tradable asset as described by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Ticker symbol
    pub ticker: Ticker,
    /// Declared asset class
    pub class: AssetClass,
}

impl AssetDescriptor {
    /// Creates a descriptor for a ticker and class
    pub fn new(ticker: impl Into<Ticker>, class: AssetClass) -> Self {
        Self {
            ticker: ticker.into(),
            class,
        }
    }
}

/// A successfully fetched price for an asset
///
/// Produced exactly once per successful fetch and owned by the cache;
/// callers receive clones. Never constructed with an absent price (a
/// provider response without a usable price yields no record at all).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecord {
    /// The asset's ticker
    pub ticker: Ticker,

    /// Price in the target currency
    pub price: f64,

    /// ISO currency code of the price (e.g. "PHP")
    pub currency: String,

    /// Platform the price belongs to (e.g. "PSE", "Crypto")
    pub exchange: String,

    /// Data source that produced the record
    pub source: String,

    /// When the price was retrieved
    pub retrieved_at: DateTime<Utc>,
}

impl PriceRecord {
    /// Creates a new price record stamped with the current time
    pub fn new(
        ticker: Ticker,
        price: f64,
        currency: impl Into<String>,
        exchange: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            ticker,
            price,
            currency: currency.into(),
            exchange: exchange.into(),
            source: source.into(),
            retrieved_at: Utc::now(),
        }
    }

    /// Whether the record is younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }

    /// Age of the record
    pub fn age(&self) -> Duration {
        let age = Utc::now().signed_duration_since(self.retrieved_at);
        Duration::from_millis(age.num_milliseconds().max(0) as u64)
    }
}
