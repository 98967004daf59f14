//! Ticker to provider-internal identifier resolution
//!
//! The equity provider keys its quote pages by an internal company id, not
//! by ticker. Resolution goes through the provider's symbol search endpoint
//! once and the mapping is then held for the process lifetime (a ticker's
//! underlying id is stable, an accepted staleness risk). Failed or empty
//! resolutions are never cached, so a transient search outage does not
//! permanently fail a ticker.

use crate::error::ProviderError;
use crate::transport::Transport;
use crate::types::Ticker;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maps a ticker to a provider-internal identifier
#[async_trait]
pub trait SymbolResolver: Send + Sync {
    /// Resolves `ticker` to the provider's internal id.
    ///
    /// `Ok(None)` means the provider knows no such symbol; an `Err` is a
    /// transient failure the caller may retry on the next refresh.
    async fn resolve(&self, ticker: &Ticker) -> Result<Option<String>, ProviderError>;
}

/// One candidate row from the symbol search endpoint
#[derive(Debug, Deserialize)]
struct SearchCandidate {
    #[serde(rename = "cmpyId")]
    company_id: i64,
    symbol: String,
}

/// Resolver backed by the exchange's symbol search endpoint
pub struct SearchResolver {
    transport: Arc<dyn Transport>,
    search_url: String,
    mapping: RwLock<HashMap<Ticker, String>>,
}

impl SearchResolver {
    /// Creates a resolver querying `search_url` (ticker appended) over
    /// `transport`
    pub fn new(transport: Arc<dyn Transport>, search_url: impl Into<String>) -> Self {
        Self {
            transport,
            search_url: search_url.into(),
            mapping: RwLock::new(HashMap::new()),
        }
    }

    async fn lookup(&self, ticker: &Ticker) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}{}",
            self.search_url,
            urlencoding::encode(ticker.as_str())
        );
        let body = self.transport.get_text(&url).await?;

        let candidates: Vec<SearchCandidate> = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("symbol search returned malformed JSON: {e}"))
        })?;

        Ok(candidates
            .iter()
            .find(|candidate| candidate.symbol.eq_ignore_ascii_case(ticker.as_str()))
            .map(|candidate| candidate.company_id.to_string()))
    }
}

#[async_trait]
impl SymbolResolver for SearchResolver {
    async fn resolve(&self, ticker: &Ticker) -> Result<Option<String>, ProviderError> {
        if let Some(id) = self.mapping.read().await.get(ticker) {
            return Ok(Some(id.clone()));
        }

        match self.lookup(ticker).await? {
            Some(id) => {
                tracing::debug!(ticker = %ticker, id = %id, "Resolved ticker to company id");
                self.mapping
                    .write()
                    .await
                    .insert(ticker.clone(), id.clone());
                Ok(Some(id))
            }
            // No exact match: do not cache the miss.
            None => Ok(None),
        }
    }
}
