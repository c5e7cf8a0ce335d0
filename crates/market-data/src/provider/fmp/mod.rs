//! Financial Modeling Prep market data provider.
//!
//! Endpoints used:
//! - `/v3/quote/{symbols}` for single and batched quotes
//! - `/v3/historical-price-full/{symbol}` for daily bars
//! - `/v3/historical-chart/{5min|30min}/{symbol}` for intraday bars
//! - `/v3/search` for symbol lookup
//! - `/v3/profile/{symbol}` and `/v3/key-metrics-ttm/{symbol}` for fundamentals
//!
//! API documentation: https://site.financialmodelingprep.com/developer/docs

mod models;

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::America::New_York;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{
    ChartRange, CompanyProfile, Granularity, HistoricalBar, KeyMetrics, Quote, SearchResult,
};
use crate::provider::MarketDataProvider;

use models::{
    into_bars, FmpBar, FmpDailyHistory, FmpErrorResponse, FmpKeyMetricsTtm, FmpProfile, FmpQuote,
    FmpSearchItem,
};

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api";
const PROVIDER_ID: &str = "FMP";

/// Most tickers fit in a single URL; FMP rejects very long symbol lists.
const MAX_BATCH_SYMBOLS: usize = 50;

/// Financial Modeling Prep provider.
pub struct FmpProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FmpProvider {
    /// Create a provider against the public FMP API.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a provider against a custom base URL (proxies, test servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET an endpoint and return the raw body.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("FMP request: {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })?;

        // FMP also reports bad keys and plan limits as a 200 with an error object
        if let Ok(error_resp) = serde_json::from_str::<FmpErrorResponse>(&body) {
            if let Some(message) = error_resp.error_message {
                if message.to_lowercase().contains("limit") {
                    return Err(MarketDataError::RateLimited {
                        provider: PROVIDER_ID.to_string(),
                    });
                }
                return Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message,
                });
            }
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        Ok(body)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        what: &str,
    ) -> Result<T, MarketDataError> {
        let text = self.fetch(endpoint, params).await?;
        serde_json::from_str(&text).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse {} response: {}", what, e),
        })
    }

    async fn fetch_quote_batch(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let joined = symbols.join(",");
        let endpoint = format!("/v3/quote/{}", joined);
        let raw: Vec<FmpQuote> = self.fetch_json(&endpoint, &[], "quote").await?;

        let mut quotes = Vec::with_capacity(raw.len());
        for item in raw {
            match item.into_quote() {
                Ok(quote) => quotes.push(quote),
                Err(e) => tracing::warn!("Skipping invalid quote: {}", e),
            }
        }
        Ok(quotes)
    }

    async fn fetch_daily(
        &self,
        symbol: &str,
        range: ChartRange,
    ) -> Result<Vec<HistoricalBar>, MarketDataError> {
        let now = Utc::now();
        let from = range.start(now).format("%Y-%m-%d").to_string();
        let to = now.format("%Y-%m-%d").to_string();
        let endpoint = format!("/v3/historical-price-full/{}", symbol);

        let raw: FmpDailyHistory = self
            .fetch_json(&endpoint, &[("from", &from), ("to", &to)], "history")
            .await?;
        Ok(into_bars(symbol, raw.historical))
    }

    async fn fetch_intraday(
        &self,
        symbol: &str,
        range: ChartRange,
        interval: &str,
    ) -> Result<Vec<HistoricalBar>, MarketDataError> {
        let now = Utc::now();
        let from = range.start(now).format("%Y-%m-%d").to_string();
        let to = now.format("%Y-%m-%d").to_string();
        let endpoint = format!("/v3/historical-chart/{}/{}", interval, symbol);

        let raw: Vec<FmpBar> = self
            .fetch_json(&endpoint, &[("from", &from), ("to", &to)], "intraday chart")
            .await?;
        let sessions = match range {
            ChartRange::OneDay => 1,
            _ => 5,
        };
        Ok(keep_last_sessions(into_bars(symbol, raw), sessions))
    }
}

/// Symbols go into the URL path, so anything beyond ticker characters is
/// rejected before a request is made.
fn check_symbol(symbol: &str) -> Result<String, MarketDataError> {
    let trimmed = symbol.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= 10
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^'));
    if !valid {
        return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
    }
    Ok(trimmed.to_uppercase())
}

/// Keeps bars from the last `sessions` New York trading dates present in the series.
fn keep_last_sessions(bars: Vec<HistoricalBar>, sessions: usize) -> Vec<HistoricalBar> {
    let dates: BTreeSet<_> = bars
        .iter()
        .map(|bar| bar.timestamp.with_timezone(&New_York).date_naive())
        .collect();
    let cutoff = dates
        .iter()
        .rev()
        .nth(sessions.saturating_sub(1))
        .or_else(|| dates.iter().next())
        .copied();
    let Some(cutoff) = cutoff else {
        return bars;
    };
    bars.into_iter()
        .filter(|bar| bar.timestamp.with_timezone(&New_York).date_naive() >= cutoff)
        .collect()
}

#[async_trait]
impl MarketDataProvider for FmpProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = check_symbol(symbol)?;
        self.fetch_quote_batch(std::slice::from_ref(&symbol))
            .await?
            .into_iter()
            .find(|q| q.symbol == symbol)
            .ok_or(MarketDataError::SymbolNotFound(symbol))
    }

    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let valid: Vec<String> = symbols
            .iter()
            .filter_map(|s| check_symbol(s).ok())
            .collect();
        if valid.is_empty() {
            return Ok(Vec::new());
        }

        let mut quotes = Vec::with_capacity(valid.len());
        for chunk in valid.chunks(MAX_BATCH_SYMBOLS) {
            quotes.extend(self.fetch_quote_batch(chunk).await?);
        }
        Ok(quotes)
    }

    async fn get_history(
        &self,
        symbol: &str,
        range: ChartRange,
    ) -> Result<Vec<HistoricalBar>, MarketDataError> {
        let symbol = check_symbol(symbol)?;
        let bars = match range.granularity() {
            Granularity::Daily => self.fetch_daily(&symbol, range).await?,
            granularity => {
                let interval = granularity.intraday_token().unwrap_or("5min");
                self.fetch_intraday(&symbol, range, interval).await?
            }
        };

        if bars.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }
        Ok(bars)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, MarketDataError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.clamp(1, 50).to_string();
        let raw: Vec<FmpSearchItem> = self
            .fetch_json("/v3/search", &[("query", query), ("limit", &limit)], "search")
            .await?;
        Ok(raw.into_iter().map(FmpSearchItem::into_search_result).collect())
    }

    async fn get_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        let symbol = check_symbol(symbol)?;
        let endpoint = format!("/v3/profile/{}", symbol);
        let raw: Vec<FmpProfile> = self.fetch_json(&endpoint, &[], "profile").await?;
        raw.into_iter()
            .next()
            .map(FmpProfile::into_profile)
            .ok_or(MarketDataError::SymbolNotFound(symbol))
    }

    async fn get_key_metrics(&self, symbol: &str) -> Result<KeyMetrics, MarketDataError> {
        let symbol = check_symbol(symbol)?;
        let endpoint = format!("/v3/key-metrics-ttm/{}", symbol);
        let raw: Vec<FmpKeyMetricsTtm> = self.fetch_json(&endpoint, &[], "key metrics").await?;
        raw.into_iter()
            .next()
            .map(|m| m.into_key_metrics(&symbol))
            .ok_or(MarketDataError::SymbolNotFound(symbol))
    }
}
