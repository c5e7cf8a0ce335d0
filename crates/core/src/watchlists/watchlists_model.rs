//! Watchlist domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use finboard_market_data::Quote;

use crate::constants::MAX_WATCHLIST_SYMBOLS;
use crate::symbols::normalize_symbols;
use crate::validation::validate_name;
use crate::{Error, Result};

/// A named, ordered list of symbols a user follows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub symbols: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Watchlist {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Appends a normalized symbol.
    ///
    /// Returns `Ok(false)` when it is already present. Fails with
    /// `LimitExceeded` when the list is full.
    pub fn add_symbol(&mut self, symbol: &str) -> Result<bool> {
        if self.contains(symbol) {
            return Ok(false);
        }
        if self.symbols.len() >= MAX_WATCHLIST_SYMBOLS {
            return Err(Error::LimitExceeded(format!(
                "A watchlist can hold at most {} symbols",
                MAX_WATCHLIST_SYMBOLS
            )));
        }
        self.symbols.push(symbol.to_string());
        Ok(true)
    }

    /// Returns false when the symbol was not in the list.
    pub fn remove_symbol(&mut self, symbol: &str) -> bool {
        let before = self.symbols.len();
        self.symbols.retain(|s| s != symbol);
        self.symbols.len() != before
    }
}

/// Input model for creating a watchlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchlist {
    pub name: String,
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl NewWatchlist {
    /// Validates and returns the input with a trimmed name and normalized,
    /// de-duplicated symbols.
    pub fn validated(self) -> Result<Self> {
        validate_name(&self.name, "Watchlist")?;
        let symbols = normalize_symbols(&self.symbols)?;
        if symbols.len() > MAX_WATCHLIST_SYMBOLS {
            return Err(Error::LimitExceeded(format!(
                "A watchlist can hold at most {} symbols",
                MAX_WATCHLIST_SYMBOLS
            )));
        }
        Ok(Self {
            name: self.name.trim().to_string(),
            symbols,
        })
    }
}

/// Input model for renaming a watchlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistUpdate {
    pub name: String,
}

/// Quotes for the symbols of a watchlist, in watchlist order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistQuotes {
    pub watchlist_id: String,
    pub quotes: Vec<Quote>,
    /// Symbols the provider returned nothing for
    pub unavailable: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn watchlist(symbols: Vec<&str>) -> Watchlist {
        let now = Utc::now().naive_utc();
        Watchlist {
            id: "wl-1".to_string(),
            name: "Tech".to_string(),
            user_id: "u1".to_string(),
            symbols: symbols.into_iter().map(String::from).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_symbol_is_idempotent() {
        let mut wl = watchlist(vec!["AAPL"]);
        assert!(!wl.add_symbol("AAPL").unwrap());
        assert!(wl.add_symbol("MSFT").unwrap());
        assert_eq!(wl.symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_add_symbol_respects_limit() {
        let symbols: Vec<String> = (0..MAX_WATCHLIST_SYMBOLS).map(|i| format!("S{:02}", i)).collect();
        let mut wl = watchlist(vec![]);
        wl.symbols = symbols;

        assert!(matches!(wl.add_symbol("NEW"), Err(Error::LimitExceeded(_))));
        // Duplicates of a full list are still a no-op
        let existing = wl.symbols[0].clone();
        assert!(!wl.add_symbol(&existing).unwrap());
    }

    #[test]
    fn test_remove_symbol() {
        let mut wl = watchlist(vec!["AAPL", "MSFT"]);
        assert!(wl.remove_symbol("AAPL"));
        assert!(!wl.remove_symbol("AAPL"));
        assert_eq!(wl.symbols, vec!["MSFT"]);
    }

    #[test]
    fn test_new_watchlist_validation() {
        let input = NewWatchlist {
            name: "  Dividend  ".to_string(),
            symbols: vec!["ko".to_string(), "PEP".to_string(), "KO".to_string()],
        };
        let validated = input.validated().unwrap();
        assert_eq!(validated.name, "Dividend");
        assert_eq!(validated.symbols, vec!["KO", "PEP"]);

        let bad = NewWatchlist {
            name: "Bad".to_string(),
            symbols: vec!["abcde1".to_string()],
        };
        assert!(matches!(bad.validated(), Err(Error::Validation(_))));
    }
}
