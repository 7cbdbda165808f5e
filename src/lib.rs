//! Quote Gateway - cryptocurrency prices in a fixed set of fiat currencies
//!
//! This library provides symbol validation, the per-currency aggregation over
//! an upstream quote provider, and the HTTP surface that exposes it.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod quotes;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::QuoteError;
pub use quotes::aggregator::PriceAggregator;
pub use quotes::symbol::{is_valid_symbol, Symbol};
pub use quotes::types::PriceMap;
