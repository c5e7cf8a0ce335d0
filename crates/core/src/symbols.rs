//! Ticker symbol validation.
//!
//! Watchlists, comparison selections and positions only accept plain
//! exchange tickers of one to five uppercase ASCII letters.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{Result, ValidationError};

lazy_static! {
    /// Format: ^[A-Z]{1,5}$
    static ref SYMBOL_REGEX: Regex = Regex::new(r"^[A-Z]{1,5}$").expect("Invalid regex pattern");
}

/// Returns true when `symbol` is already a valid ticker. No normalization.
pub fn is_valid_symbol(symbol: &str) -> bool {
    SYMBOL_REGEX.is_match(symbol)
}

/// Trims and uppercases user input, then validates it.
pub fn normalize_symbol(input: &str) -> Result<String> {
    let symbol = input.trim().to_ascii_uppercase();
    if !is_valid_symbol(&symbol) {
        return Err(ValidationError::InvalidSymbol(input.to_string()).into());
    }
    Ok(symbol)
}

/// Normalizes every symbol and drops duplicates, keeping first occurrence order.
pub fn normalize_symbols(inputs: &[String]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let symbol = normalize_symbol(input)?;
        if !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_valid_symbols() {
        assert!(is_valid_symbol("AAPL"));
        assert!(is_valid_symbol("F"));
        assert!(is_valid_symbol("GOOGL"));
    }

    #[test]
    fn test_invalid_symbols() {
        assert!(!is_valid_symbol("abcde1"));
        assert!(!is_valid_symbol(""));
        assert!(!is_valid_symbol("TOOLONG"));
        assert!(!is_valid_symbol("aapl"));
        assert!(!is_valid_symbol("BRK.B"));
        assert!(!is_valid_symbol("AB1"));
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("  aapl ").unwrap(), "AAPL");
        assert!(matches!(
            normalize_symbol("abcde1"),
            Err(Error::Validation(ValidationError::InvalidSymbol(_)))
        ));
    }

    #[test]
    fn test_normalize_symbols_dedupes_in_order() {
        let input = vec![
            "msft".to_string(),
            "AAPL".to_string(),
            "MSFT".to_string(),
            "aapl".to_string(),
        ];
        assert_eq!(normalize_symbols(&input).unwrap(), vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn test_normalize_symbols_rejects_any_invalid() {
        let input = vec!["AAPL".to_string(), "1234".to_string()];
        assert!(normalize_symbols(&input).is_err());
    }
}
