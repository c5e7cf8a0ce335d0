//! Historical OHLCV series and the chart ranges the dashboard requests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// One OHLCV bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalBar {
    /// Start of the bar (UTC)
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// Bar width requested from the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    FiveMinutes,
    ThirtyMinutes,
    Daily,
}

impl Granularity {
    /// Interval token used by intraday endpoints, `None` for daily bars.
    pub fn intraday_token(&self) -> Option<&'static str> {
        match self {
            Granularity::FiveMinutes => Some("5min"),
            Granularity::ThirtyMinutes => Some("30min"),
            Granularity::Daily => None,
        }
    }
}

/// Chart ranges offered by the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChartRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[default]
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
}

impl ChartRange {
    pub const ALL: [ChartRange; 8] = [
        ChartRange::OneDay,
        ChartRange::FiveDays,
        ChartRange::OneMonth,
        ChartRange::ThreeMonths,
        ChartRange::SixMonths,
        ChartRange::YearToDate,
        ChartRange::OneYear,
        ChartRange::FiveYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1D",
            ChartRange::FiveDays => "5D",
            ChartRange::OneMonth => "1M",
            ChartRange::ThreeMonths => "3M",
            ChartRange::SixMonths => "6M",
            ChartRange::YearToDate => "YTD",
            ChartRange::OneYear => "1Y",
            ChartRange::FiveYears => "5Y",
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            ChartRange::OneDay => Granularity::FiveMinutes,
            ChartRange::FiveDays => Granularity::ThirtyMinutes,
            _ => Granularity::Daily,
        }
    }

    /// Start of the window ending at `now`.
    ///
    /// Intraday ranges reach back a few extra calendar days so weekends and
    /// holidays still yield bars; callers trim to the trading sessions they get.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ChartRange::OneDay => now - Duration::days(3),
            ChartRange::FiveDays => now - Duration::days(8),
            ChartRange::OneMonth => now - Duration::days(30),
            ChartRange::ThreeMonths => now - Duration::days(91),
            ChartRange::SixMonths => now - Duration::days(182),
            ChartRange::YearToDate => {
                let jan_first = NaiveDate::from_ymd_opt(now.year(), 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| Utc.from_utc_datetime(&dt));
                jan_first.unwrap_or(now - Duration::days(365))
            }
            ChartRange::OneYear => now - Duration::days(365),
            ChartRange::FiveYears => now - Duration::days(5 * 365 + 1),
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartRange {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        ChartRange::ALL
            .into_iter()
            .find(|range| range.as_str() == wanted)
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Unknown chart range '{}'", s),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranges() {
        assert_eq!("1d".parse::<ChartRange>().unwrap(), ChartRange::OneDay);
        assert_eq!("ytd".parse::<ChartRange>().unwrap(), ChartRange::YearToDate);
        assert_eq!(" 5Y ".parse::<ChartRange>().unwrap(), ChartRange::FiveYears);
        assert!("10Y".parse::<ChartRange>().is_err());
    }

    #[test]
    fn test_granularity_by_range() {
        assert_eq!(ChartRange::OneDay.granularity(), Granularity::FiveMinutes);
        assert_eq!(ChartRange::FiveDays.granularity(), Granularity::ThirtyMinutes);
        assert_eq!(ChartRange::OneYear.granularity(), Granularity::Daily);
        assert_eq!(Granularity::Daily.intraday_token(), None);
    }

    #[test]
    fn test_year_to_date_starts_on_january_first() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let start = ChartRange::YearToDate.start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(ChartRange::OneMonth.start(now) < now);
    }

    #[test]
    fn test_range_serde_uses_short_labels() {
        assert_eq!(
            serde_json::to_string(&ChartRange::ThreeMonths).unwrap(),
            "\"3M\""
        );
        assert_eq!(
            serde_json::from_str::<ChartRange>("\"YTD\"").unwrap(),
            ChartRange::YearToDate
        );
    }
}
