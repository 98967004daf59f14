//! # Asset Price SDK
//!
//! Resolves ticker symbols (equities and cryptocurrencies) to current prices
//! in a target currency, from heterogeneous, rate-limited external sources.
//!
//! The service caches prices with a TTL, coalesces concurrent fetches for
//! the same ticker into a single network round trip, and degrades silently:
//! a ticker that cannot be priced yields an absent result, never an error or
//! a panic.
//!
//! ## Usage
//!
//! ```no_run
//! use asset_price_sdk::{AssetClass, AssetDescriptor, PriceService, PriceServiceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = PriceService::new(PriceServiceConfig::default())?;
//!
//! // Price a single asset
//! let btc = AssetDescriptor::new("BTC", AssetClass::Crypto);
//! if let Some(record) = service.get_price(&btc).await {
//!     println!("{}: {:.2} {}", record.ticker, record.price, record.currency);
//! }
//!
//! // Price a portfolio batch; unpriced assets are simply absent
//! let assets = vec![
//!     AssetDescriptor::new("AC", AssetClass::Equity),
//!     AssetDescriptor::new("BTC", AssetClass::Crypto),
//! ];
//! for (ticker, record) in service.get_prices(&assets).await {
//!     println!("{}: {:.2} {}", ticker, record.price, record.currency);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod flight;
pub mod metrics;
pub mod providers;
pub mod resolver;
pub mod service;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::PriceServiceConfig;
pub use error::ProviderError;
pub use metrics::ProviderMetrics;
pub use service::PriceService;
pub use types::{AssetClass, AssetDescriptor, PriceRecord, Ticker};
