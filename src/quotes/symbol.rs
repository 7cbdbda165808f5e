//! Cryptocurrency symbol normalization and validation.
//!
//! Canonical symbol: trimmed, uppercase, 2-5 ASCII letters or digits with at
//! least one letter ("BTC", "A1", "DOGE"). Pure digits are rejected.

use std::fmt;

use crate::constants::symbol::{MAX_LEN, MIN_LEN};
use crate::error::QuoteError;

/// A validated symbol. Only constructible through [`Symbol::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self, QuoteError> {
        let normalized = normalize(raw);
        if is_canonical(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(QuoteError::InvalidSymbol {
                input: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Case-insensitive check of a raw path parameter.
pub fn is_valid_symbol(raw: &str) -> bool {
    is_canonical(&normalize(raw))
}

fn is_canonical(s: &str) -> bool {
    (MIN_LEN..=MAX_LEN).contains(&s.len())
        && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && s.chars().any(|c| c.is_ascii_uppercase())
}
