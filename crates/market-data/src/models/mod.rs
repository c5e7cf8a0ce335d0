//! Market data models
//!
//! - `quote` - Real-time quote snapshot (Quote)
//! - `history` - OHLCV bars and chart ranges (HistoricalBar, ChartRange, Granularity)
//! - `search` - Symbol search results (SearchResult)
//! - `profile` - Company profile (CompanyProfile)
//! - `metrics` - TTM fundamentals (KeyMetrics)

mod history;
mod metrics;
mod profile;
mod quote;
mod search;

pub use history::{ChartRange, Granularity, HistoricalBar};
pub use metrics::KeyMetrics;
pub use profile::CompanyProfile;
pub use quote::Quote;
pub use search::SearchResult;
