//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - The Financial Modeling Prep HTTP provider

mod traits;

pub mod fmp;

// Re-exports
pub use traits::MarketDataProvider;
