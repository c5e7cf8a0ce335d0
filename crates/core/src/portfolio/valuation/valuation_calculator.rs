//! Position valuation and portfolio aggregation.
//!
//! Every function here is pure: the same inputs always produce the same
//! output, and nothing fails. Invalid numbers are rejected when positions are
//! created, so they never reach this module.

use std::collections::HashMap;

use log::warn;
use rust_decimal::Decimal;

use finboard_market_data::Quote;

use super::{DashboardSummary, PortfolioMetrics, ValuedPosition};
use crate::portfolio::{Portfolio, Position};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `numerator / denominator × 100`, or 0 when the denominator is not positive.
fn percent_of(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator * HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Values one position.
///
/// `day_change` is the per-share price change reported by the quote; the
/// position's day change is `shares × day_change`. Without a `current_price`
/// the purchase price stands in and both day-change values are 0.
pub fn value_position(
    position: &Position,
    current_price: Option<Decimal>,
    day_change: Option<Decimal>,
    day_change_percent: Option<Decimal>,
) -> ValuedPosition {
    let has_market_data = current_price.is_some();
    let price = current_price.unwrap_or(position.purchase_price);
    let (change, change_percent) = if has_market_data {
        (
            day_change.unwrap_or(Decimal::ZERO),
            day_change_percent.unwrap_or(Decimal::ZERO),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let current_value = position.shares * price;
    let cost_basis = position.shares * position.purchase_price;
    let gain_loss = current_value - cost_basis;

    ValuedPosition {
        position: position.clone(),
        current_price: price,
        current_value,
        cost_basis,
        gain_loss,
        gain_loss_percent: percent_of(gain_loss, cost_basis),
        day_change: position.shares * change,
        day_change_percent: change_percent,
        has_market_data,
    }
}

/// Values a position against an optional quote.
pub fn value_position_with_quote(position: &Position, quote: Option<&Quote>) -> ValuedPosition {
    match quote {
        Some(q) => value_position(
            position,
            Some(q.price),
            Some(q.change),
            Some(q.change_percent),
        ),
        None => value_position(position, None, None, None),
    }
}

/// Values every position against a symbol → quote map.
pub fn value_positions(positions: &[Position], quotes: &HashMap<String, Quote>) -> Vec<ValuedPosition> {
    positions
        .iter()
        .map(|position| {
            let quote = quotes.get(&position.symbol);
            if quote.is_none() {
                warn!(
                    "No quote for {}; valuing position {} at purchase price",
                    position.symbol, position.id
                );
            }
            value_position_with_quote(position, quote)
        })
        .collect()
}

/// Sums valued positions into portfolio totals.
///
/// Day change percent is measured against the prior-day value
/// `total_value - day_change`.
pub fn aggregate(portfolio: &Portfolio, valued_positions: Vec<ValuedPosition>) -> PortfolioMetrics {
    let total_value: Decimal = valued_positions.iter().map(|p| p.current_value).sum();
    let total_cost_basis: Decimal = valued_positions.iter().map(|p| p.cost_basis).sum();
    let day_change: Decimal = valued_positions.iter().map(|p| p.day_change).sum();
    let total_gain_loss = total_value - total_cost_basis;

    let positions_with_market_data = valued_positions.iter().filter(|p| p.has_market_data).count();
    let mut missing_quotes: Vec<String> = Vec::new();
    for valued in valued_positions.iter().filter(|p| !p.has_market_data) {
        if !missing_quotes.contains(&valued.position.symbol) {
            missing_quotes.push(valued.position.symbol.clone());
        }
    }

    PortfolioMetrics {
        id: portfolio.id.clone(),
        name: portfolio.name.clone(),
        description: portfolio.description.clone(),
        user_id: portfolio.user_id.clone(),
        created_at: portfolio.created_at,
        updated_at: portfolio.updated_at,
        positions: valued_positions,
        total_value,
        total_cost_basis,
        total_gain_loss,
        total_gain_loss_percent: percent_of(total_gain_loss, total_cost_basis),
        day_change,
        day_change_percent: percent_of(day_change, total_value - day_change),
        positions_with_market_data,
        missing_quotes,
    }
}

/// Combines per-portfolio metrics into one dashboard rollup.
pub fn summarize(portfolios: Vec<PortfolioMetrics>) -> DashboardSummary {
    let total_value: Decimal = portfolios.iter().map(|p| p.total_value).sum();
    let total_cost_basis: Decimal = portfolios.iter().map(|p| p.total_cost_basis).sum();
    let day_change: Decimal = portfolios.iter().map(|p| p.day_change).sum();
    let total_gain_loss = total_value - total_cost_basis;
    let position_count = portfolios.iter().map(|p| p.positions.len()).sum();

    let mut missing_quotes: Vec<String> = Vec::new();
    for symbol in portfolios.iter().flat_map(|p| p.missing_quotes.iter()) {
        if !missing_quotes.contains(symbol) {
            missing_quotes.push(symbol.clone());
        }
    }

    DashboardSummary {
        total_value,
        total_cost_basis,
        total_gain_loss,
        total_gain_loss_percent: percent_of(total_gain_loss, total_cost_basis),
        day_change,
        day_change_percent: percent_of(day_change, total_value - day_change),
        portfolio_count: portfolios.len(),
        position_count,
        portfolios,
        missing_quotes,
    }
}
