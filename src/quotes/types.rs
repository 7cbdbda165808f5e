use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// `status` block of a provider response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamStatus {
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Per-currency quote. Only `price` is read; other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyQuote {
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolQuote {
    #[serde(default)]
    pub quote: HashMap<String, CurrencyQuote>,
}

/// Parsed body of one (symbol, currency) provider query.
///
/// `data` stays a raw `Value` because the provider answers with `{}`, `[]`
/// or `null` when it has nothing, and a symbol entry may be malformed without
/// invalidating the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamQuoteResponse {
    #[serde(default)]
    pub status: UpstreamStatus,
    #[serde(default)]
    pub data: Value,
}

impl UpstreamQuoteResponse {
    /// Anything but an explicit zero code counts as a provider error.
    pub fn is_error(&self) -> bool {
        self.status.error_code != Some(0)
    }

    /// True only when the provider actually reported a non-zero code.
    pub fn has_error_code(&self) -> bool {
        matches!(self.status.error_code, Some(code) if code != 0)
    }

    /// True when the provider returned no data for any symbol.
    pub fn has_no_data(&self) -> bool {
        match &self.data {
            Value::Null => true,
            Value::Object(m) => m.is_empty(),
            Value::Array(a) => a.is_empty(),
            _ => false,
        }
    }

    /// `data[symbol].quote[currency].price`, or None if any level is missing.
    pub fn price(&self, symbol: &str, currency: &str) -> Option<f64> {
        let entry = self.data.get(symbol)?;
        let parsed: SymbolQuote = serde_json::from_value(entry.clone()).ok()?;
        parsed.quote.get(currency)?.price
    }
}

/// Price for one target currency; `None` is the absent marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEntry {
    pub currency: String,
    pub price: Option<f64>,
}

/// Currency -> price for one request, in target currency order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceMap {
    entries: Vec<PriceEntry>,
}

impl PriceMap {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    pub fn insert(&mut self, currency: impl Into<String>, price: Option<f64>) {
        let currency = currency.into();
        match self.entries.iter_mut().find(|e| e.currency == currency) {
            Some(existing) => existing.price = price,
            None => self.entries.push(PriceEntry { currency, price }),
        }
    }

    pub fn get(&self, currency: &str) -> Option<Option<f64>> {
        self.entries
            .iter()
            .find(|e| e.currency == currency)
            .map(|e| e.price)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.currency.as_str())
    }

    pub fn priced_count(&self) -> usize {
        self.entries.iter().filter(|e| e.price.is_some()).count()
    }

    /// Empty, or every entry absent.
    pub fn has_no_prices(&self) -> bool {
        self.is_empty() || self.priced_count() == 0
    }
}

// Serialized as a JSON object keeping insertion order.
impl Serialize for PriceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.currency, &entry.price)?;
        }
        map.end()
    }
}
