//! Error types for the market data crate.
//!
//! Every provider maps transport and payload failures into [`MarketDataError`].
//! Callers (the core services) surface these unchanged; nothing in this crate
//! retries a failed request.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol exists but the provider has no bars in the requested window.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (bad key, 5xx, unparseable body).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned data that failed boundary validation.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// The provider does not implement this operation.
    #[error("Operation '{operation}' not supported by {provider}")]
    NotSupported {
        /// The operation that was requested
        operation: String,
        /// The provider that doesn't support it
        provider: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns true when the failure is about the request itself (unknown
    /// symbol, empty range) rather than the provider being unavailable.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SymbolNotFound(_) | Self::NoDataForRange | Self::ValidationFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        assert!(MarketDataError::SymbolNotFound("ZZZZ".to_string()).is_terminal());
        assert!(MarketDataError::NoDataForRange.is_terminal());
        assert!(!MarketDataError::RateLimited {
            provider: "FMP".to_string()
        }
        .is_terminal());
        assert!(!MarketDataError::Timeout {
            provider: "FMP".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: INVALID");

        let error = MarketDataError::RateLimited {
            provider: "FMP".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: FMP");

        let error = MarketDataError::ProviderError {
            provider: "FMP".to_string(),
            message: "Invalid API KEY".to_string(),
        };
        assert_eq!(format!("{}", error), "Provider error: FMP - Invalid API KEY");

        let error = MarketDataError::NotSupported {
            operation: "search".to_string(),
            provider: "STATIC".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Operation 'search' not supported by STATIC"
        );
    }
}
