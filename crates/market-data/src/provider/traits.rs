//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! market data sources (and decorators such as the cache) implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{ChartRange, CompanyProfile, HistoricalBar, KeyMetrics, Quote, SearchResult};

/// Trait for market data providers.
///
/// Implementations return values that already passed boundary validation:
/// callers never see raw provider payloads.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use finboard_market_data::{MarketDataProvider, MarketDataError, Quote, ChartRange, HistoricalBar};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
///         // ...
///     }
///
///     async fn get_history(
///         &self,
///         symbol: &str,
///         range: ChartRange,
///     ) -> Result<Vec<HistoricalBar>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider (e.g., "FMP").
    ///
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Fetch latest quotes for several symbols.
    ///
    /// Symbols the provider doesn't know are omitted from the result rather
    /// than failing the whole batch. The default implementation issues one
    /// `get_quote` per symbol; providers with a batch endpoint override it.
    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.get_quote(symbol).await {
                Ok(quote) => quotes.push(quote),
                Err(MarketDataError::SymbolNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(quotes)
    }

    /// Fetch historical bars for a symbol over a chart range.
    ///
    /// Bars are ordered by timestamp ascending.
    async fn get_history(
        &self,
        symbol: &str,
        range: ChartRange,
    ) -> Result<Vec<HistoricalBar>, MarketDataError>;

    /// Search for symbols matching the query (ticker or company name).
    ///
    /// Default implementation returns `NotSupported`.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, MarketDataError> {
        let _ = (query, limit);
        Err(MarketDataError::NotSupported {
            operation: "search".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// Fetch the company profile for a symbol.
    ///
    /// Default implementation returns `NotSupported`.
    async fn get_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        let _ = symbol;
        Err(MarketDataError::NotSupported {
            operation: "profile".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// Fetch TTM key metrics for a symbol.
    ///
    /// Default implementation returns `NotSupported`.
    async fn get_key_metrics(&self, symbol: &str) -> Result<KeyMetrics, MarketDataError> {
        let _ = symbol;
        Err(MarketDataError::NotSupported {
            operation: "key_metrics".to_string(),
            provider: self.id().to_string(),
        })
    }
}
