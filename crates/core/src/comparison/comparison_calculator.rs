use rust_decimal::Decimal;

use finboard_market_data::HistoricalBar;

use super::ComparisonPoint;

/// Rebases a series to percent change from its first close.
///
/// A first close of 0 yields 0 for every point.
pub fn normalize_series(bars: &[HistoricalBar]) -> Vec<ComparisonPoint> {
    let Some(base) = bars.first().map(|b| b.close) else {
        return Vec::new();
    };

    bars.iter()
        .map(|bar| ComparisonPoint {
            timestamp: bar.timestamp,
            close: bar.close,
            change_percent: if base > Decimal::ZERO {
                (bar.close - base) / base * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            },
        })
        .collect()
}
