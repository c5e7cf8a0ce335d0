use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trailing-twelve-month fundamentals for a symbol.
///
/// Every ratio is optional: providers omit or null out metrics that do not
/// apply (a bank has no meaningful current ratio, a loss-maker no P/E).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub symbol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_value: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to_sales: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to_book: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_ratio: Option<Decimal>,

    /// Return on equity, as a fraction (0.25 = 25%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_on_equity: Option<Decimal>,

    /// Dividend yield, as a fraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_per_share: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_income_per_share: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_cash_flow_per_share: Option<Decimal>,
}

impl KeyMetrics {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }
}
