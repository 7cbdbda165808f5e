//! CoinMarketCap latest-quotes adapter (REST).

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{
    symbol::Symbol,
    traits::{ProviderResult, QuoteProvider},
    types::UpstreamQuoteResponse,
};
use crate::config::AppConfig;
use crate::constants::upstream::API_KEY_HEADER;
use crate::error::TransportError;

#[derive(Clone)]
pub struct CoinMarketCapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoinMarketCapClient {
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
    }
}

#[async_trait]
impl QuoteProvider for CoinMarketCapClient {
    fn name(&self) -> &'static str {
        "coinmarketcap"
    }

    async fn fetch_quote(
        &self,
        symbol: &Symbol,
        currency: &str,
    ) -> ProviderResult<UpstreamQuoteResponse> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("symbol", symbol.as_str()), ("convert", currency)])
            .header("Accepts", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let text = resp.text().await.map_err(classify)?;
        debug!("{} {} {} -> {}", self.name(), symbol, currency, status);

        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        // CoinMarketCap reports auth and plan errors as 4xx with the usual
        // status envelope; pass those through so they surface as provider errors.
        match serde_json::from_str::<UpstreamQuoteResponse>(&text) {
            Ok(parsed) if parsed.has_error_code() => Ok(parsed),
            _ => Err(TransportError::Http {
                status: status.as_u16(),
                body: text,
            }),
        }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err)
    }
}
