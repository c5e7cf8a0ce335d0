//! Domain event types.

use serde::{Deserialize, Serialize};

/// Facts about user data changes, emitted after the write succeeded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    /// A portfolio was created, renamed or deleted.
    PortfolioChanged {
        user_id: String,
        portfolio_id: String,
        deleted: bool,
    },

    /// Positions of a portfolio were added, updated or removed.
    PositionsChanged {
        user_id: String,
        portfolio_id: String,
        symbols: Vec<String>,
    },

    /// A watchlist or its symbols changed.
    WatchlistChanged {
        user_id: String,
        watchlist_id: String,
        deleted: bool,
    },

    /// The user's comparison selection changed.
    ComparisonChanged { user_id: String },

    /// Cached market data was dropped; clients should refetch.
    MarketDataRefreshed { symbols: Vec<String> },
}

impl DomainEvent {
    pub fn portfolio_changed(user_id: &str, portfolio_id: &str) -> Self {
        Self::PortfolioChanged {
            user_id: user_id.to_string(),
            portfolio_id: portfolio_id.to_string(),
            deleted: false,
        }
    }

    pub fn portfolio_deleted(user_id: &str, portfolio_id: &str) -> Self {
        Self::PortfolioChanged {
            user_id: user_id.to_string(),
            portfolio_id: portfolio_id.to_string(),
            deleted: true,
        }
    }

    pub fn positions_changed(user_id: &str, portfolio_id: &str, symbols: Vec<String>) -> Self {
        Self::PositionsChanged {
            user_id: user_id.to_string(),
            portfolio_id: portfolio_id.to_string(),
            symbols,
        }
    }

    pub fn watchlist_changed(user_id: &str, watchlist_id: &str) -> Self {
        Self::WatchlistChanged {
            user_id: user_id.to_string(),
            watchlist_id: watchlist_id.to_string(),
            deleted: false,
        }
    }

    pub fn watchlist_deleted(user_id: &str, watchlist_id: &str) -> Self {
        Self::WatchlistChanged {
            user_id: user_id.to_string(),
            watchlist_id: watchlist_id.to_string(),
            deleted: true,
        }
    }

    pub fn comparison_changed(user_id: &str) -> Self {
        Self::ComparisonChanged {
            user_id: user_id.to_string(),
        }
    }

    pub fn market_data_refreshed(symbols: Vec<String>) -> Self {
        Self::MarketDataRefreshed { symbols }
    }

    /// Owning user, or `None` for events every client should see.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::PortfolioChanged { user_id, .. }
            | Self::PositionsChanged { user_id, .. }
            | Self::WatchlistChanged { user_id, .. }
            | Self::ComparisonChanged { user_id } => Some(user_id),
            Self::MarketDataRefreshed { .. } => None,
        }
    }

    /// Short name used as the SSE event type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PortfolioChanged { .. } => "portfolio_changed",
            Self::PositionsChanged { .. } => "positions_changed",
            Self::WatchlistChanged { .. } => "watchlist_changed",
            Self::ComparisonChanged { .. } => "comparison_changed",
            Self::MarketDataRefreshed { .. } => "market_data_refreshed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let event = DomainEvent::portfolio_changed("u1", "p1");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "portfolio_changed");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["deleted"], false);
    }

    #[test]
    fn test_user_scope() {
        assert_eq!(DomainEvent::comparison_changed("u1").user_id(), Some("u1"));
        assert_eq!(DomainEvent::market_data_refreshed(vec![]).user_id(), None);
    }
}
