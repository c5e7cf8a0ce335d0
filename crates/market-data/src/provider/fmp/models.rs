//! Financial Modeling Prep API response models.
//!
//! Payloads are deserialized into these loosely-typed structs first and then
//! validated into the crate's public models. Nothing outside this module sees
//! an FMP field name.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::errors::MarketDataError;
use crate::models::{CompanyProfile, HistoricalBar, KeyMetrics, Quote, SearchResult};

/// Item of the /v3/quote/{symbols} array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpQuote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub changes_percentage: Option<f64>,
    pub change: Option<f64>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub exchange: Option<String>,
    pub volume: Option<f64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub eps: Option<f64>,
    pub pe: Option<f64>,
    /// Unix seconds
    pub timestamp: Option<i64>,
}

/// Response from /v3/historical-price-full/{symbol}
///
/// FMP answers `{}` for symbols without history, hence the default.
#[derive(Debug, Deserialize, Default)]
pub struct FmpDailyHistory {
    #[serde(default)]
    pub historical: Vec<FmpBar>,
}

/// One bar from either the daily or the intraday endpoint.
#[derive(Debug, Deserialize)]
pub struct FmpBar {
    /// "YYYY-MM-DD" for daily bars, "YYYY-MM-DD HH:MM:SS" (New York time) for intraday
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Item of the /v3/search array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpSearchItem {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange_short_name: Option<String>,
    pub stock_exchange: Option<String>,
}

/// Item of the /v3/profile/{symbol} array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpProfile {
    pub symbol: String,
    pub company_name: Option<String>,
    pub currency: Option<String>,
    pub exchange_short_name: Option<String>,
    pub industry: Option<String>,
    pub sector: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub ceo: Option<String>,
    pub country: Option<String>,
    /// FMP sends employee counts as a string
    pub full_time_employees: Option<String>,
    pub image: Option<String>,
    pub mkt_cap: Option<f64>,
    pub beta: Option<f64>,
    pub ipo_date: Option<String>,
}

/// Item of the /v3/key-metrics-ttm/{symbol} array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpKeyMetricsTtm {
    #[serde(rename = "marketCapTTM")]
    pub market_cap: Option<f64>,
    #[serde(rename = "enterpriseValueTTM")]
    pub enterprise_value: Option<f64>,
    #[serde(rename = "peRatioTTM")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "priceToSalesRatioTTM")]
    pub price_to_sales: Option<f64>,
    #[serde(rename = "pbRatioTTM")]
    pub price_to_book: Option<f64>,
    #[serde(rename = "debtToEquityTTM")]
    pub debt_to_equity: Option<f64>,
    #[serde(rename = "currentRatioTTM")]
    pub current_ratio: Option<f64>,
    #[serde(rename = "roeTTM")]
    pub return_on_equity: Option<f64>,
    #[serde(rename = "dividendYieldTTM")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "revenuePerShareTTM")]
    pub revenue_per_share: Option<f64>,
    #[serde(rename = "netIncomePerShareTTM")]
    pub net_income_per_share: Option<f64>,
    #[serde(rename = "freeCashFlowPerShareTTM")]
    pub free_cash_flow_per_share: Option<f64>,
}

/// Error body FMP returns with a 200 or 4xx status
#[derive(Debug, Deserialize)]
pub struct FmpErrorResponse {
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
}

// ============================================================================
// Validation helpers
// ============================================================================

fn invalid(message: String) -> MarketDataError {
    MarketDataError::ValidationFailed { message }
}

/// Converts a required finite float into a Decimal.
fn required_decimal(value: Option<f64>, field: &str, symbol: &str) -> Result<Decimal, MarketDataError> {
    let raw = value.ok_or_else(|| invalid(format!("{}: missing {}", symbol, field)))?;
    if !raw.is_finite() {
        return Err(invalid(format!("{}: non-finite {} ({})", symbol, field, raw)));
    }
    Decimal::try_from(raw).map_err(|_| invalid(format!("{}: unrepresentable {} ({})", symbol, field, raw)))
}

/// Converts an optional float, dropping values that are not finite.
fn optional_decimal(value: Option<f64>) -> Option<Decimal> {
    value
        .filter(|v| v.is_finite())
        .and_then(|v| Decimal::try_from(v).ok())
}

fn volume_from(value: Option<f64>) -> u64 {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or(0)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parses an FMP bar date. Intraday timestamps are exchange-local (New York).
fn parse_bar_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return New_York
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// ============================================================================
// Conversions into public models
// ============================================================================

impl FmpQuote {
    pub fn into_quote(self) -> Result<Quote, MarketDataError> {
        let symbol = self.symbol.trim().to_uppercase();
        let price = required_decimal(self.price, "price", &symbol)?;
        if price.is_sign_negative() {
            return Err(invalid(format!("{}: negative price {}", symbol, price)));
        }

        let timestamp = self
            .timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(Quote {
            name: non_empty(self.name),
            price,
            change: optional_decimal(self.change).unwrap_or(Decimal::ZERO),
            change_percent: optional_decimal(self.changes_percentage).unwrap_or(Decimal::ZERO),
            volume: volume_from(self.volume),
            open: optional_decimal(self.open),
            day_high: optional_decimal(self.day_high),
            day_low: optional_decimal(self.day_low),
            previous_close: optional_decimal(self.previous_close),
            year_high: optional_decimal(self.year_high),
            year_low: optional_decimal(self.year_low),
            market_cap: optional_decimal(self.market_cap),
            pe: optional_decimal(self.pe),
            eps: optional_decimal(self.eps),
            exchange: non_empty(self.exchange),
            timestamp,
            symbol,
        })
    }
}

impl FmpBar {
    /// Validates a bar: finite non-negative prices with low ≤ open/close ≤ high.
    pub fn into_bar(self, symbol: &str) -> Result<HistoricalBar, MarketDataError> {
        let timestamp = parse_bar_timestamp(&self.date)
            .ok_or_else(|| invalid(format!("{}: unparseable bar date '{}'", symbol, self.date)))?;
        let open = required_decimal(self.open, "open", symbol)?;
        let high = required_decimal(self.high, "high", symbol)?;
        let low = required_decimal(self.low, "low", symbol)?;
        let close = required_decimal(self.close, "close", symbol)?;

        if low.is_sign_negative() {
            return Err(invalid(format!("{}: negative low on {}", symbol, self.date)));
        }
        if low > open.min(close) || high < open.max(close) {
            return Err(invalid(format!(
                "{}: OHLC invariant violated on {}",
                symbol, self.date
            )));
        }

        Ok(HistoricalBar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: volume_from(self.volume),
        })
    }
}

/// Validates raw bars, drops the ones that fail and returns them ascending.
pub fn into_bars(symbol: &str, raw: Vec<FmpBar>) -> Vec<HistoricalBar> {
    let mut bars: Vec<HistoricalBar> = raw
        .into_iter()
        .filter_map(|bar| match bar.into_bar(symbol) {
            Ok(bar) => Some(bar),
            Err(e) => {
                warn!("Dropping invalid bar: {}", e);
                None
            }
        })
        .collect();
    bars.sort_by_key(|bar| bar.timestamp);
    bars
}

impl FmpSearchItem {
    pub fn into_search_result(self) -> SearchResult {
        let exchange = non_empty(self.exchange_short_name)
            .or_else(|| non_empty(self.stock_exchange))
            .unwrap_or_default();
        let name = non_empty(self.name).unwrap_or_else(|| self.symbol.clone());
        SearchResult {
            symbol: self.symbol.trim().to_uppercase(),
            name,
            exchange,
            currency: non_empty(self.currency),
        }
    }
}

impl FmpProfile {
    pub fn into_profile(self) -> CompanyProfile {
        let symbol = self.symbol.trim().to_uppercase();
        CompanyProfile {
            name: non_empty(self.company_name).unwrap_or_else(|| symbol.clone()),
            exchange: non_empty(self.exchange_short_name),
            currency: non_empty(self.currency),
            sector: non_empty(self.sector),
            industry: non_empty(self.industry),
            ceo: non_empty(self.ceo),
            website: non_empty(self.website),
            description: non_empty(self.description),
            country: non_empty(self.country),
            employees: self
                .full_time_employees
                .as_deref()
                .and_then(|s| s.trim().parse::<u64>().ok()),
            logo_url: non_empty(self.image),
            market_cap: optional_decimal(self.mkt_cap),
            beta: optional_decimal(self.beta),
            ipo_date: non_empty(self.ipo_date),
            symbol,
        }
    }
}

impl FmpKeyMetricsTtm {
    pub fn into_key_metrics(self, symbol: &str) -> KeyMetrics {
        KeyMetrics {
            symbol: symbol.to_string(),
            market_cap: optional_decimal(self.market_cap),
            enterprise_value: optional_decimal(self.enterprise_value),
            pe_ratio: optional_decimal(self.pe_ratio),
            price_to_sales: optional_decimal(self.price_to_sales),
            price_to_book: optional_decimal(self.price_to_book),
            debt_to_equity: optional_decimal(self.debt_to_equity),
            current_ratio: optional_decimal(self.current_ratio),
            return_on_equity: optional_decimal(self.return_on_equity),
            dividend_yield: optional_decimal(self.dividend_yield),
            revenue_per_share: optional_decimal(self.revenue_per_share),
            net_income_per_share: optional_decimal(self.net_income_per_share),
            free_cash_flow_per_share: optional_decimal(self.free_cash_flow_per_share),
        }
    }
}
