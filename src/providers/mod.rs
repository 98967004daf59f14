//! Provider fetcher implementations

pub mod crypto;
pub mod equity;

pub use crypto::CryptoProvider;
pub use equity::EquityProvider;
