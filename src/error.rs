//! Custom error types for the quote gateway
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;

/// Request-level failures surfaced to API callers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error(
        "Invalid cryptocurrency code '{input}'. Expected 2-5 letters or digits with at least one letter"
    )]
    InvalidSymbol { input: String },

    #[error("CoinMarketCap API error for {currency}: {message}")]
    Upstream { currency: String, message: String },

    #[error("Cryptocurrency '{symbol}' not found")]
    NotFound { symbol: String },

    #[error("No prices available for cryptocurrency '{symbol}'")]
    NoPrices { symbol: String },
}

impl QuoteError {
    /// True for the variants that map to HTTP 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuoteError::NotFound { .. } | QuoteError::NoPrices { .. })
    }
}

/// Per-currency transport failures. Recovered locally by the aggregator.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
