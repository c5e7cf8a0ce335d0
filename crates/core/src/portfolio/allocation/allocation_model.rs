//! Allocation models for the portfolio breakdown chart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share of total portfolio value held in one position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub position_id: String,
    pub symbol: String,
    /// Current value of the position
    pub value: Decimal,
    /// Percentage of total value (0-100)
    pub percentage: Decimal,
    /// Color for visualization (hex code)
    pub color: String,
}
