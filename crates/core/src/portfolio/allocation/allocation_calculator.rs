//! Allocation breakdown of valued positions.

use rust_decimal::Decimal;

use super::AllocationSlice;
use crate::constants::ALLOCATION_PALETTE;
use crate::portfolio::valuation::ValuedPosition;

/// Splits total value across positions, largest first.
///
/// Returns an empty list when the total value is 0. Colours come from
/// [`ALLOCATION_PALETTE`] by rank and wrap around.
pub fn allocate(valued_positions: &[ValuedPosition]) -> Vec<AllocationSlice> {
    let total: Decimal = valued_positions.iter().map(|p| p.current_value).sum();
    if total <= Decimal::ZERO {
        return Vec::new();
    }

    let mut ranked: Vec<&ValuedPosition> = valued_positions.iter().collect();
    ranked.sort_by(|a, b| b.current_value.cmp(&a.current_value));

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, valued)| AllocationSlice {
            position_id: valued.position.id.clone(),
            symbol: valued.position.symbol.clone(),
            value: valued.current_value,
            percentage: valued.current_value / total * Decimal::ONE_HUNDRED,
            color: ALLOCATION_PALETTE[index % ALLOCATION_PALETTE.len()].to_string(),
        })
        .collect()
}
