use async_trait::async_trait;

use super::{symbol::Symbol, types::UpstreamQuoteResponse};
use crate::error::TransportError;

pub type ProviderResult<T> = Result<T, TransportError>;

/// One upstream query per (symbol, currency). Implementations return the
/// parsed envelope as-is; classification belongs to the aggregator.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_quote(
        &self,
        symbol: &Symbol,
        currency: &str,
    ) -> ProviderResult<UpstreamQuoteResponse>;
}
