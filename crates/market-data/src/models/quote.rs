use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Real-time quote snapshot for a single symbol.
///
/// `price`, `change` and `change_percent` are always present once a quote has
/// passed provider validation; the remaining fields depend on the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,

    /// Short display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Last traded price
    pub price: Decimal,

    /// Absolute change since previous close
    pub change: Decimal,

    /// Change since previous close, in percent (1.5 = 1.5%)
    pub change_percent: Decimal,

    /// Session volume
    pub volume: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_low: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    /// 52-week high
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_high: Option<Decimal>,

    /// 52-week low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_low: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,

    /// Price-to-earnings ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe: Option<Decimal>,

    /// Earnings per share
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<Decimal>,

    /// Exchange short name (e.g., "NASDAQ")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,

    /// Time of the last trade
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Create a quote with the minimal fields the valuation core consumes.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        change: Decimal,
        change_percent: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            price,
            change,
            change_percent,
            volume: 0,
            open: None,
            day_high: None,
            day_low: None,
            previous_close: None,
            year_high: None,
            year_low: None,
            market_cap: None,
            pe: None,
            eps: None,
            exchange: None,
            timestamp,
        }
    }

    /// Set the trading volume.
    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = volume;
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new("AAPL", dec!(150.25), dec!(1.25), dec!(0.84), Utc::now())
            .with_volume(1_000_000)
            .with_name("Apple Inc.");
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, dec!(150.25));
        assert_eq!(quote.volume, 1_000_000);
        assert_eq!(quote.name.as_deref(), Some("Apple Inc."));
        assert!(quote.open.is_none());
    }

    #[test]
    fn test_quote_serializes_camel_case() {
        let quote = Quote::new("MSFT", dec!(400), dec!(-2), dec!(-0.5), Utc::now());
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json.get("changePercent").is_some());
        assert!(json.get("dayHigh").is_none());
    }
}
