//! Derived valuation models. None of these are persisted.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::Position;

/// A position priced against the latest quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValuedPosition {
    #[serde(flatten)]
    pub position: Position,
    pub current_price: Decimal,
    /// shares × current_price
    pub current_value: Decimal,
    /// shares × purchase_price
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    /// Percent of cost basis, 0 when cost basis is 0
    pub gain_loss_percent: Decimal,
    /// shares × quote change
    pub day_change: Decimal,
    pub day_change_percent: Decimal,
    /// False when no live quote was available and the purchase price stood in
    pub has_market_data: bool,
}

/// Portfolio totals and rollups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub positions: Vec<ValuedPosition>,
    pub total_value: Decimal,
    pub total_cost_basis: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_percent: Decimal,
    pub day_change: Decimal,
    pub day_change_percent: Decimal,
    pub positions_with_market_data: usize,
    /// Symbols valued at purchase price because no quote was available
    pub missing_quotes: Vec<String>,
}

impl PortfolioMetrics {
    pub fn has_missing_quotes(&self) -> bool {
        !self.missing_quotes.is_empty()
    }
}

/// Totals across every portfolio a user owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_value: Decimal,
    pub total_cost_basis: Decimal,
    pub total_gain_loss: Decimal,
    pub total_gain_loss_percent: Decimal,
    pub day_change: Decimal,
    pub day_change_percent: Decimal,
    pub portfolio_count: usize,
    pub position_count: usize,
    pub portfolios: Vec<PortfolioMetrics>,
    pub missing_quotes: Vec<String>,
}
