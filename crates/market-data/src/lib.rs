//! Finboard Market Data Crate
//!
//! Provider-agnostic access to quotes, price history, symbol search and
//! company fundamentals.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! |  Core services   | --> |  CachedProvider  | --> |   FmpProvider    |
//! +------------------+     +------------------+     +------------------+
//!                             (TTL per kind)          (HTTP + validation)
//! ```
//!
//! Everything a provider returns has already been validated: prices are
//! finite and non-negative, OHLC bars are consistent and ordered ascending.
//!
//! # Core Types
//!
//! - [`Quote`] - latest price snapshot
//! - [`HistoricalBar`] / [`ChartRange`] - OHLCV series and the ranges charts request
//! - [`SearchResult`], [`CompanyProfile`], [`KeyMetrics`] - lookup and fundamentals
//! - [`MarketDataProvider`] - the provider seam
//! - [`MarketDataError`] - provider failures

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;

pub use cache::{CacheConfig, CachedProvider, TtlCache};
pub use errors::MarketDataError;
pub use models::{
    ChartRange, CompanyProfile, Granularity, HistoricalBar, KeyMetrics, Quote, SearchResult,
};
pub use provider::fmp::{FmpProvider, DEFAULT_BASE_URL as FMP_DEFAULT_BASE_URL};
pub use provider::MarketDataProvider;
