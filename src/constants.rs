//! Application-wide constants and defaults
//!
//! Everything the gateway falls back to when neither the config file nor the
//! environment supplies a value.

use std::time::Duration;

/// Upstream quote provider constants
pub mod upstream {
    use super::*;

    /// CoinMarketCap latest-quotes endpoint
    pub const DEFAULT_BASE_URL: &str =
        "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";

    /// Header carrying the provider API key
    pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

    /// Per-request timeout for a single (symbol, currency) call
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Used when the provider reports an error without a message
    pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
}

/// Target currencies reported for every symbol, in response order
pub const DEFAULT_TARGET_CURRENCIES: [&str; 5] = ["USD", "EUR", "BRL", "GBP", "AUD"];

/// Symbol grammar bounds
pub mod symbol {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 5;
}

/// Server constants
pub mod server {
    pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
    pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
}

/// Environment variable names
pub mod env {
    pub const API_KEY: &str = "API_KEY";
    pub const CONFIG_PATH: &str = "CONFIG_PATH";
    pub const TARGET_CURRENCIES: &str = "TARGET_CURRENCIES";
    pub const QUOTE_API_URL: &str = "QUOTE_API_URL";
    pub const BIND_ADDR: &str = "BIND_ADDR";
    pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
}
