//! Stock comparison selection and chart models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finboard_market_data::{ChartRange, Quote};

use crate::constants::{COMPARISON_PALETTE, MAX_COMPARISON_SYMBOLS};

/// One symbol in the comparison selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    pub symbol: String,
    pub name: String,
    pub color: String,
}

/// Ordered selection of up to four symbols.
///
/// Colours follow slot order: whenever membership changes every entry is
/// recoloured from [`COMPARISON_PALETTE`] by its index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSelection {
    entries: Vec<ComparisonEntry>,
}

impl ComparisonSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a selection from stored entries, dropping duplicates and
    /// anything past the limit.
    pub fn from_entries(entries: Vec<ComparisonEntry>) -> Self {
        let mut selection = Self::new();
        for entry in entries {
            selection.add(&entry.symbol, &entry.name);
        }
        selection
    }

    pub fn entries(&self) -> &[ComparisonEntry] {
        &self.entries
    }

    pub fn symbols(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.symbol.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_COMPARISON_SYMBOLS
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.iter().any(|e| e.symbol == symbol)
    }

    /// Appends a symbol. Returns false, leaving the selection unchanged,
    /// when it is full or already holds the symbol.
    pub fn add(&mut self, symbol: &str, name: &str) -> bool {
        if self.is_full() || self.contains(symbol) {
            return false;
        }
        self.entries.push(ComparisonEntry {
            symbol: symbol.to_string(),
            name: name.to_string(),
            color: String::new(),
        });
        self.recolor();
        true
    }

    /// Returns false when the symbol was not selected.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.symbol != symbol);
        if self.entries.len() == before {
            return false;
        }
        self.recolor();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn recolor(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.color = COMPARISON_PALETTE[index % COMPARISON_PALETTE.len()].to_string();
        }
    }
}

/// A close normalized against the first close of the series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPoint {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
    /// Percent change from the first close in the series
    pub change_percent: Decimal,
}

/// Normalized price series for one selected symbol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSeries {
    pub symbol: String,
    pub name: String,
    pub color: String,
    pub points: Vec<ComparisonPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

/// Everything the comparison chart needs for one range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonChart {
    pub range: ChartRange,
    pub series: Vec<ComparisonSeries>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_selection() -> ComparisonSelection {
        let mut selection = ComparisonSelection::new();
        for symbol in ["AAPL", "MSFT", "GOOGL", "AMZN"] {
            assert!(selection.add(symbol, symbol));
        }
        selection
    }

    #[test]
    fn test_fifth_symbol_leaves_selection_unchanged() {
        let mut selection = full_selection();
        let before = selection.clone();

        assert!(!selection.add("TSLA", "Tesla"));
        assert_eq!(selection, before);
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut selection = ComparisonSelection::new();
        assert!(selection.add("AAPL", "Apple"));
        assert!(!selection.add("AAPL", "Apple"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_colors_follow_slot_order() {
        let mut selection = full_selection();
        let colors: Vec<_> = selection.entries().iter().map(|e| e.color.as_str()).collect();
        assert_eq!(colors, COMPARISON_PALETTE.to_vec());

        assert!(selection.remove("AAPL"));
        assert_eq!(selection.entries()[0].symbol, "MSFT");
        assert_eq!(selection.entries()[0].color, COMPARISON_PALETTE[0]);
        assert_eq!(selection.entries()[2].color, COMPARISON_PALETTE[2]);
    }

    #[test]
    fn test_remove_missing_symbol() {
        let mut selection = full_selection();
        assert!(!selection.remove("TSLA"));
        assert_eq!(selection.len(), 4);
    }

    #[test]
    fn test_from_entries_enforces_limit() {
        let entries = ["A", "B", "B", "C", "D", "E"]
            .iter()
            .map(|s| ComparisonEntry {
                symbol: s.to_string(),
                name: s.to_string(),
                color: "#000000".to_string(),
            })
            .collect();
        let selection = ComparisonSelection::from_entries(entries);
        assert_eq!(selection.symbols(), vec!["A", "B", "C", "D"]);
        assert_eq!(selection.entries()[0].color, COMPARISON_PALETTE[0]);
    }

    #[test]
    fn test_clear() {
        let mut selection = full_selection();
        selection.clear();
        assert!(selection.is_empty());
    }
}
