//! Price service: routing dispatcher over the provider fetchers
//!
//! Pure routing by declared asset class; all caching and request coalescing
//! lives inside the providers, each with fully independent state, so an
//! equity "AC" can never collide with a crypto asset that happens to share
//! the ticker string. A service instance owns all of its state; construct
//! one per application (or per test) and share it behind an `Arc`.

use crate::config::PriceServiceConfig;
use crate::error::ProviderError;
use crate::metrics::ProviderMetrics;
use crate::providers::{CryptoProvider, EquityProvider};
use crate::transport::{HttpTransport, RelayTransport, Transport};
use crate::types::{AssetClass, AssetDescriptor, PriceRecord, Ticker};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

/// Asset price aggregation service
///
/// # Example
/// ```no_run
/// use asset_price_sdk::{AssetClass, AssetDescriptor, PriceService, PriceServiceConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = PriceService::new(PriceServiceConfig::default())?;
///
/// let asset = AssetDescriptor::new("BTC", AssetClass::Crypto);
/// if let Some(record) = service.get_price(&asset).await {
///     println!("{}: {:.2} {}", record.ticker, record.price, record.currency);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PriceService {
    equity: EquityProvider,
    crypto: CryptoProvider,
}

impl PriceService {
    /// Creates a service with real HTTP transports.
    ///
    /// Equity traffic goes through the configured relay; crypto traffic goes
    /// directly to the markets endpoint.
    pub fn new(config: PriceServiceConfig) -> Result<Self, ProviderError> {
        let http: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.request_timeout)?);
        let relayed: Arc<dyn Transport> = Arc::new(RelayTransport::new(
            Arc::clone(&http),
            config.relay_url.clone(),
        ));
        Ok(Self::with_transports(config, relayed, http))
    }

    /// Creates a service with injected transports, for tests
    pub fn with_transports(
        config: PriceServiceConfig,
        equity_transport: Arc<dyn Transport>,
        crypto_transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            equity: EquityProvider::new(&config, equity_transport),
            crypto: CryptoProvider::new(&config, crypto_transport),
        }
    }

    /// Fetches the current price for one asset.
    ///
    /// Routes by declared class; an `Other` asset is unpriced immediately,
    /// with no network activity. This call never fails: an unpriceable
    /// asset simply yields `None`.
    pub async fn get_price(&self, asset: &AssetDescriptor) -> Option<PriceRecord> {
        match asset.class {
            AssetClass::Equity => self.equity.fetch_price(&asset.ticker).await,
            AssetClass::Crypto => self.crypto.fetch_price(&asset.ticker).await,
            AssetClass::Other => {
                tracing::debug!(ticker = %asset.ticker, "Asset class has no provider; unpriced");
                None
            }
        }
    }

    /// Fetches prices for a batch of assets concurrently.
    ///
    /// Per-asset failures are independent: unpriced tickers are simply
    /// absent from the returned map.
    pub async fn get_prices(&self, assets: &[AssetDescriptor]) -> HashMap<Ticker, PriceRecord> {
        let fetches = assets.iter().map(|asset| async move {
            (asset.ticker.clone(), self.get_price(asset).await)
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(ticker, record)| record.map(|record| (ticker, record)))
            .collect()
    }

    /// Fetch metrics for the equity provider
    pub async fn equity_metrics(&self) -> ProviderMetrics {
        self.equity.metrics().await
    }

    /// Fetch metrics for the crypto provider
    pub async fn crypto_metrics(&self) -> ProviderMetrics {
        self.crypto.metrics().await
    }
}
