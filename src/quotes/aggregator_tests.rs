//! Unit tests for the per-currency aggregation and its failure handling.

#[cfg(test)]
mod aggregator_tests {
    use crate::config::FanOut;
    use crate::error::{QuoteError, TransportError};
    use crate::quotes::aggregator::PriceAggregator;
    use crate::quotes::symbol::Symbol;
    use crate::quotes::traits::{ProviderResult, QuoteProvider};
    use crate::quotes::types::UpstreamQuoteResponse;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const CURRENCIES: [&str; 5] = ["USD", "EUR", "BRL", "GBP", "AUD"];

    #[derive(Clone)]
    enum Reply {
        Body(Value),
        Timeout,
    }

    /// Replies per currency and records every call it receives.
    struct ScriptedProvider {
        replies: HashMap<String, Reply>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<(&str, Reply)>) -> Arc<Self> {
            Arc::new(Self {
                replies: replies
                    .into_iter()
                    .map(|(c, r)| (c.to_string(), r))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn uniform(reply: Reply) -> Arc<Self> {
            Self::new(CURRENCIES.iter().map(|c| (*c, reply.clone())).collect())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_quote(
            &self,
            _symbol: &Symbol,
            currency: &str,
        ) -> ProviderResult<UpstreamQuoteResponse> {
            self.calls.lock().unwrap().push(currency.to_string());
            match self.replies.get(currency) {
                Some(Reply::Body(v)) => Ok(serde_json::from_value(v.clone())?),
                Some(Reply::Timeout) | None => Err(TransportError::Timeout),
            }
        }
    }

    fn priced(symbol: &str, currency: &str, price: f64) -> Reply {
        Reply::Body(json!({
            "status": {"error_code": 0, "error_message": null},
            "data": {symbol: {"quote": {currency: {"price": price}}}}
        }))
    }

    fn provider_error(code: i64, message: &str) -> Reply {
        Reply::Body(json!({
            "status": {"error_code": code, "error_message": message}
        }))
    }

    fn empty_data() -> Reply {
        Reply::Body(json!({"status": {"error_code": 0}, "data": {}}))
    }

    fn aggregator(provider: Arc<ScriptedProvider>, fan_out: FanOut) -> PriceAggregator {
        PriceAggregator::with_currencies(
            provider,
            CURRENCIES.iter().map(|c| c.to_string()).collect(),
            fan_out,
        )
    }

    fn btc() -> Symbol {
        Symbol::parse("BTC").unwrap()
    }

    fn all_priced() -> Arc<ScriptedProvider> {
        ScriptedProvider::new(
            CURRENCIES
                .iter()
                .enumerate()
                .map(|(i, c)| (*c, priced("BTC", c, 40000.0 + i as f64)))
                .collect(),
        )
    }

    // ============= Success Tests =============

    #[tokio::test]
    async fn test_all_currencies_priced() {
        let provider = all_priced();
        let prices = aggregator(provider.clone(), FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap();

        assert_eq!(prices.len(), 5);
        assert_eq!(prices.priced_count(), 5);
        assert_eq!(prices.get("USD"), Some(Some(40000.0)));
        assert_eq!(prices.get("AUD"), Some(Some(40004.0)));
        assert_eq!(prices.currencies().collect::<Vec<_>>(), CURRENCIES.to_vec());
        assert_eq!(provider.calls(), CURRENCIES.to_vec());
    }

    #[tokio::test]
    async fn test_partial_transport_failures_tolerated() {
        let provider = ScriptedProvider::new(vec![
            ("USD", priced("BTC", "USD", 50000.0)),
            ("EUR", Reply::Timeout),
            ("BRL", priced("BTC", "BRL", 250000.0)),
            ("GBP", Reply::Timeout),
            ("AUD", Reply::Timeout),
        ]);
        let prices = aggregator(provider.clone(), FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap();

        assert_eq!(prices.len(), 5);
        assert_eq!(prices.get("USD"), Some(Some(50000.0)));
        assert_eq!(prices.get("EUR"), Some(None));
        assert_eq!(prices.get("BRL"), Some(Some(250000.0)));
        assert_eq!(prices.get("GBP"), Some(None));
        assert_eq!(provider.calls().len(), 5);

        let json = serde_json::to_value(&prices).unwrap();
        assert_eq!(json["EUR"], Value::Null);
        assert_eq!(json["USD"], json!(50000.0));
    }

    #[tokio::test]
    async fn test_missing_price_field_is_absent_entry() {
        let provider = ScriptedProvider::new(vec![
            ("USD", priced("BTC", "USD", 1.0)),
            (
                "EUR",
                Reply::Body(json!({
                    "status": {"error_code": 0},
                    "data": {"BTC": {"quote": {"EUR": {}}}}
                })),
            ),
            (
                "BRL",
                Reply::Body(json!({
                    "status": {"error_code": 0},
                    "data": {"ETH": {"quote": {"BRL": {"price": 9.0}}}}
                })),
            ),
            ("GBP", priced("BTC", "GBP", 2.0)),
            ("AUD", priced("BTC", "AUD", 3.0)),
        ]);
        let prices = aggregator(provider, FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap();

        assert_eq!(prices.get("EUR"), Some(None));
        assert_eq!(prices.get("BRL"), Some(None));
        assert_eq!(prices.priced_count(), 3);
    }

    // ============= Failure Tests =============

    #[tokio::test]
    async fn test_all_transport_failures_is_not_found() {
        let provider = ScriptedProvider::uniform(Reply::Timeout);
        let err = aggregator(provider.clone(), FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            QuoteError::NoPrices {
                symbol: "BTC".to_string()
            }
        );
        assert!(err.is_not_found());
        assert_eq!(provider.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_all_prices_missing_is_not_found() {
        let provider = ScriptedProvider::uniform(Reply::Body(json!({
            "status": {"error_code": 0},
            "data": {"BTC": {"quote": {}}}
        })));
        let err = aggregator(provider, FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::NoPrices { .. }));
    }

    #[tokio::test]
    async fn test_provider_error_aborts_immediately() {
        let provider = ScriptedProvider::uniform(provider_error(1001, "Invalid API key"));
        let err = aggregator(provider.clone(), FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            QuoteError::Upstream {
                currency: "USD".to_string(),
                message: "Invalid API key".to_string()
            }
        );
        assert_eq!(provider.calls(), vec!["USD"]);
        assert!(err.to_string().contains("CoinMarketCap API error for USD"));
    }

    #[tokio::test]
    async fn test_provider_error_after_successes_still_aborts() {
        let provider = ScriptedProvider::new(vec![
            ("USD", priced("BTC", "USD", 1.0)),
            ("EUR", priced("BTC", "EUR", 1.0)),
            ("BRL", provider_error(1008, "Plan limit")),
            ("GBP", priced("BTC", "GBP", 1.0)),
            ("AUD", priced("BTC", "AUD", 1.0)),
        ]);
        let err = aggregator(provider.clone(), FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap_err();

        assert!(matches!(err, QuoteError::Upstream { ref currency, .. } if currency == "BRL"));
        assert_eq!(provider.calls(), vec!["USD", "EUR", "BRL"]);
    }

    #[tokio::test]
    async fn test_provider_error_without_message() {
        let provider = ScriptedProvider::uniform(Reply::Body(json!({
            "status": {"error_code": 500}
        })));
        let err = aggregator(provider, FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap_err();
        assert!(
            matches!(err, QuoteError::Upstream { ref message, .. } if message == "Unknown error")
        );
    }

    #[tokio::test]
    async fn test_missing_status_is_upstream_error() {
        let provider = ScriptedProvider::uniform(Reply::Body(json!({
            "data": {"BTC": {"quote": {"USD": {"price": 1.0}}}}
        })));
        let err = aggregator(provider.clone(), FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            QuoteError::Upstream {
                currency: "USD".to_string(),
                message: "Unknown error".to_string()
            }
        );
        assert_eq!(provider.calls(), vec!["USD"]);
    }

    #[tokio::test]
    async fn test_empty_data_is_not_found() {
        let provider = ScriptedProvider::uniform(empty_data());
        let err = aggregator(provider.clone(), FanOut::Sequential)
            .fetch_prices(&btc())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            QuoteError::NotFound {
                symbol: "BTC".to_string()
            }
        );
        assert_eq!(provider.calls(), vec!["USD"]);
    }

    // ============= Concurrent Fan-Out Tests =============

    #[tokio::test]
    async fn test_concurrent_keeps_currency_order() {
        let provider = all_priced();
        let prices = aggregator(provider.clone(), FanOut::Concurrent)
            .fetch_prices(&btc())
            .await
            .unwrap();

        assert_eq!(prices.currencies().collect::<Vec<_>>(), CURRENCIES.to_vec());
        assert_eq!(prices.priced_count(), 5);
        assert_eq!(provider.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_first_abort_in_list_order_wins() {
        let provider = ScriptedProvider::new(vec![
            ("USD", priced("BTC", "USD", 1.0)),
            ("EUR", empty_data()),
            ("BRL", Reply::Timeout),
            ("GBP", provider_error(1001, "Invalid API key")),
            ("AUD", priced("BTC", "AUD", 1.0)),
        ]);
        let err = aggregator(provider, FanOut::Concurrent)
            .fetch_prices(&btc())
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_all_transport_failures() {
        let provider = ScriptedProvider::uniform(Reply::Timeout);
        let err = aggregator(provider, FanOut::Concurrent)
            .fetch_prices(&btc())
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::NoPrices { .. }));
    }
}
