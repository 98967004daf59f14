//! Default configuration constants for the price service
//!
//! These are the defaults baked into `PriceServiceConfig::default()`. Every
//! value here can be overridden per service instance at construction.

/// How long a cached price stays fresh (in seconds)
pub const PRICE_TTL_SECS: u64 = 60;

/// HTTP request timeout when fetching prices (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Target currency for all fetched prices
pub const TARGET_CURRENCY: &str = "PHP";

/// Relay endpoint used to reach origins that block cross-origin reads
pub const RELAY_URL: &str = "https://api.allorigins.win/raw?url=";

/// PSE Edge symbol search endpoint
pub const EQUITY_SEARCH_URL: &str =
    "https://edge.pse.com.ph/autoComplete/searchCompanyNameSymbol.ax?term=";

/// PSE Edge company quote page, parameterized by company id
pub const EQUITY_PAGE_URL: &str = "https://edge.pse.com.ph/companyPage/stockData.do?cmpy_id=";

/// Label text adjacent to the traded price on the equity quote page
pub const EQUITY_PRICE_LABEL: &str = "Last Traded Price";

/// CoinGecko markets endpoint
pub const CRYPTO_MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "asset-price-sdk/0.1.0";
