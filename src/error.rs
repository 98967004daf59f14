//! Error types for the asset price aggregation service
//!
//! These errors are internal: every fetcher catches them at its boundary,
//! logs them, and degrades to an absent result. Callers of the public API
//! only ever observe "priced" or "unpriced" for a ticker.

use thiserror::Error;

/// Errors that can occur while resolving or fetching a price
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider responded with a non-success status
    #[error("Provider returned HTTP {status}")]
    Status { status: u16 },

    /// Provider responded with 429; functionally a transport failure,
    /// logged distinctly
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Ticker could not be mapped to a provider-internal identifier
    #[error("Could not resolve ticker: {0}")]
    Resolution(String),

    /// Fetched content lacks the expected field, or its value is unusable
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Malformed response body
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Creates an extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Creates a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Creates an invalid-response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
