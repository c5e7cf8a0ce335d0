//! Search result models for symbol lookup.

use serde::{Deserialize, Serialize};

/// Result from a ticker/symbol search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Symbol/ticker (e.g., "AAPL")
    pub symbol: String,

    /// Display name (e.g., "Apple Inc.")
    pub name: String,

    /// Exchange short name (e.g., "NASDAQ")
    pub exchange: String,

    /// Quote currency (e.g., "USD")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl SearchResult {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        exchange: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            exchange: exchange.into(),
            currency: None,
        }
    }

    /// Set the currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}
