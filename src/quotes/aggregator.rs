//! Per-currency fan-out over a [`QuoteProvider`].
//!
//! Transport failures degrade to an absent entry for that currency. Provider
//! error statuses and an empty `data` payload abort the whole request.

use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{
    symbol::Symbol,
    traits::{ProviderResult, QuoteProvider},
    types::{PriceMap, UpstreamQuoteResponse},
};
use crate::config::{AppConfig, FanOut};
use crate::constants::upstream::UNKNOWN_ERROR_MESSAGE;
use crate::error::QuoteError;

#[derive(Clone)]
pub struct PriceAggregator {
    provider: Arc<dyn QuoteProvider>,
    currencies: Arc<Vec<String>>,
    fan_out: FanOut,
}

impl PriceAggregator {
    pub fn new(provider: Arc<dyn QuoteProvider>, config: &AppConfig) -> Self {
        Self::with_currencies(provider, config.target_currencies.clone(), config.fan_out)
    }

    pub fn with_currencies(
        provider: Arc<dyn QuoteProvider>,
        currencies: Vec<String>,
        fan_out: FanOut,
    ) -> Self {
        Self {
            provider,
            currencies: Arc::new(currencies),
            fan_out,
        }
    }

    pub async fn fetch_prices(&self, symbol: &Symbol) -> Result<PriceMap, QuoteError> {
        let prices = match self.fan_out {
            FanOut::Sequential => self.fetch_sequential(symbol).await?,
            FanOut::Concurrent => self.fetch_concurrent(symbol).await?,
        };

        if prices.has_no_prices() {
            warn!("No prices obtained for {} from {}", symbol, self.provider.name());
            return Err(QuoteError::NoPrices {
                symbol: symbol.to_string(),
            });
        }

        info!(
            "Fetched {} ({}/{} currencies priced)",
            symbol,
            prices.priced_count(),
            prices.len()
        );
        Ok(prices)
    }

    async fn fetch_sequential(&self, symbol: &Symbol) -> Result<PriceMap, QuoteError> {
        let mut prices = PriceMap::with_capacity(self.currencies.len());
        for currency in self.currencies.iter() {
            let result = self.provider.fetch_quote(symbol, currency).await;
            let price = classify(symbol, currency, result)?;
            prices.insert(currency.as_str(), price);
        }
        Ok(prices)
    }

    async fn fetch_concurrent(&self, symbol: &Symbol) -> Result<PriceMap, QuoteError> {
        let requests = self
            .currencies
            .iter()
            .map(|currency| self.provider.fetch_quote(symbol, currency));
        let results = join_all(requests).await;

        // join_all yields in input order, so the first abort in list order wins.
        let mut prices = PriceMap::with_capacity(self.currencies.len());
        for (currency, result) in self.currencies.iter().zip(results) {
            let price = classify(symbol, currency, result)?;
            prices.insert(currency.as_str(), price);
        }
        Ok(prices)
    }
}

/// Ok(None) records an absent entry; Err aborts the aggregation.
fn classify(
    symbol: &Symbol,
    currency: &str,
    result: ProviderResult<UpstreamQuoteResponse>,
) -> Result<Option<f64>, QuoteError> {
    let resp = match result {
        Ok(resp) => resp,
        Err(e) => {
            warn!("⚠️ Quote request for {}/{} failed: {}", symbol, currency, e);
            return Ok(None);
        }
    };

    if resp.is_error() {
        let message = resp
            .status
            .error_message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
        warn!(
            "Provider error for {}/{} (code {:?}): {}",
            symbol, currency, resp.status.error_code, message
        );
        return Err(QuoteError::Upstream {
            currency: currency.to_string(),
            message,
        });
    }

    if resp.has_no_data() {
        info!("Provider has no data for {}", symbol);
        return Err(QuoteError::NotFound {
            symbol: symbol.to_string(),
        });
    }

    let price = resp.price(symbol.as_str(), currency);
    if price.is_none() {
        debug!("No {} price in provider data for {}", currency, symbol);
    }
    Ok(price)
}
