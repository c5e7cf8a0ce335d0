//! Caching decorator over any [`MarketDataProvider`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::ttl_cache::DEFAULT_MAX_ENTRIES;
use super::TtlCache;
use crate::errors::MarketDataError;
use crate::models::{ChartRange, CompanyProfile, HistoricalBar, KeyMetrics, Quote, SearchResult};
use crate::provider::MarketDataProvider;

/// Per-kind time-to-live settings.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub quote_ttl: Duration,
    pub history_ttl: Duration,
    pub search_ttl: Duration,
    pub fundamentals_ttl: Duration,
    /// Cap per kind; keeps caches keyed by free-form input bounded.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quote_ttl: Duration::from_secs(60),
            history_ttl: Duration::from_secs(15 * 60),
            search_ttl: Duration::from_secs(60 * 60),
            fundamentals_ttl: Duration::from_secs(24 * 60 * 60),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// Defaults with a custom quote TTL.
    pub fn with_quote_ttl(quote_ttl: Duration) -> Self {
        Self {
            quote_ttl,
            ..Self::default()
        }
    }
}

/// Wraps a provider and memoizes its answers.
///
/// Errors are never cached. [`CachedProvider::invalidate`] and
/// [`CachedProvider::invalidate_all`] force the next read to go upstream.
pub struct CachedProvider<P> {
    inner: P,
    quotes: TtlCache<String, Quote>,
    history: TtlCache<(String, ChartRange), Vec<HistoricalBar>>,
    searches: TtlCache<(String, usize), Vec<SearchResult>>,
    profiles: TtlCache<String, CompanyProfile>,
    metrics: TtlCache<String, KeyMetrics>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, config: CacheConfig) -> Self {
        Self {
            inner,
            quotes: TtlCache::with_max_entries(config.quote_ttl, config.max_entries),
            history: TtlCache::with_max_entries(config.history_ttl, config.max_entries),
            searches: TtlCache::with_max_entries(config.search_ttl, config.max_entries),
            profiles: TtlCache::with_max_entries(config.fundamentals_ttl, config.max_entries),
            metrics: TtlCache::with_max_entries(config.fundamentals_ttl, config.max_entries),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Forget everything cached for one symbol.
    pub fn invalidate(&self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        debug!("Invalidating cached market data for {}", symbol);
        self.quotes.remove(&symbol);
        self.history.remove_where(|(s, _)| *s == symbol);
        self.profiles.remove(&symbol);
        self.metrics.remove(&symbol);
    }

    /// Forget everything.
    pub fn invalidate_all(&self) {
        debug!("Invalidating all cached market data");
        self.quotes.clear();
        self.history.clear();
        self.searches.clear();
        self.profiles.clear();
        self.metrics.clear();
    }
}

fn cache_key(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let key = cache_key(symbol);
        if let Some(quote) = self.quotes.get(&key) {
            return Ok(quote);
        }
        let quote = self.inner.get_quote(&key).await?;
        self.quotes.insert(key, quote.clone());
        Ok(quote)
    }

    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let mut found: HashMap<String, Quote> = HashMap::new();
        let mut misses: Vec<String> = Vec::new();

        for symbol in symbols {
            let key = cache_key(symbol);
            if found.contains_key(&key) || misses.contains(&key) {
                continue;
            }
            match self.quotes.get(&key) {
                Some(quote) => {
                    found.insert(key, quote);
                }
                None => misses.push(key),
            }
        }

        if !misses.is_empty() {
            debug!(
                "Quote cache: {} hits, {} misses",
                found.len(),
                misses.len()
            );
            for quote in self.inner.get_quotes(&misses).await? {
                self.quotes.insert(quote.symbol.clone(), quote.clone());
                found.insert(quote.symbol.clone(), quote);
            }
        }

        // Preserve request order
        Ok(symbols
            .iter()
            .filter_map(|s| found.remove(&cache_key(s)))
            .collect())
    }

    async fn get_history(
        &self,
        symbol: &str,
        range: ChartRange,
    ) -> Result<Vec<HistoricalBar>, MarketDataError> {
        let key = (cache_key(symbol), range);
        if let Some(bars) = self.history.get(&key) {
            return Ok(bars);
        }
        let bars = self.inner.get_history(&key.0, range).await?;
        self.history.insert(key, bars.clone());
        Ok(bars)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, MarketDataError> {
        let key = (query.trim().to_lowercase(), limit);
        if let Some(results) = self.searches.get(&key) {
            return Ok(results);
        }
        let results = self.inner.search(query, limit).await?;
        self.searches.insert(key, results.clone());
        Ok(results)
    }

    async fn get_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        let key = cache_key(symbol);
        if let Some(profile) = self.profiles.get(&key) {
            return Ok(profile);
        }
        let profile = self.inner.get_profile(&key).await?;
        self.profiles.insert(key, profile.clone());
        Ok(profile)
    }

    async fn get_key_metrics(&self, symbol: &str) -> Result<KeyMetrics, MarketDataError> {
        let key = cache_key(symbol);
        if let Some(metrics) = self.metrics.get(&key) {
            return Ok(metrics);
        }
        let metrics = self.inner.get_key_metrics(&key).await?;
        self.metrics.insert(key, metrics.clone());
        Ok(metrics)
    }
}
