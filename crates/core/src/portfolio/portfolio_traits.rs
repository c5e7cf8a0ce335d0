use async_trait::async_trait;

use crate::errors::Result;
use crate::portfolio::allocation::AllocationSlice;
use crate::portfolio::valuation::{DashboardSummary, PortfolioMetrics};
use crate::portfolio::{
    NewPortfolio, NewPosition, Portfolio, PortfolioUpdate, Position, PositionUpdate,
};

/// Persistence for portfolios and their positions.
///
/// Reads return portfolios with their positions loaded. Missing records are
/// reported as `DatabaseError::NotFound`.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>>;
    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio>;
    async fn create(&self, user_id: &str, new_portfolio: NewPortfolio) -> Result<Portfolio>;
    async fn update(&self, portfolio_id: &str, update: PortfolioUpdate) -> Result<Portfolio>;
    /// Deletes the portfolio and, through the cascade, its positions.
    async fn delete(&self, portfolio_id: &str) -> Result<usize>;

    fn get_position(&self, position_id: &str) -> Result<Position>;
    async fn insert_position(&self, portfolio_id: &str, new_position: NewPosition) -> Result<Position>;
    async fn save_position(&self, position: Position) -> Result<Position>;
    async fn delete_position(&self, position_id: &str) -> Result<usize>;
}

/// Portfolio operations scoped to the calling user.
///
/// Every method checks that `user_id` owns the portfolio it touches and
/// fails with `Error::PermissionDenied` otherwise.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    fn list_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>>;
    fn get_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio>;
    async fn create_portfolio(&self, user_id: &str, new_portfolio: NewPortfolio) -> Result<Portfolio>;
    async fn update_portfolio(
        &self,
        user_id: &str,
        portfolio_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio>;
    async fn delete_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<()>;

    async fn add_position(
        &self,
        user_id: &str,
        portfolio_id: &str,
        new_position: NewPosition,
    ) -> Result<Position>;
    async fn update_position(
        &self,
        user_id: &str,
        portfolio_id: &str,
        position_id: &str,
        update: PositionUpdate,
    ) -> Result<Position>;
    async fn remove_position(&self, user_id: &str, portfolio_id: &str, position_id: &str) -> Result<()>;

    /// Values every position against live quotes. Missing quotes degrade to
    /// purchase price and are listed in `missing_quotes`.
    async fn get_portfolio_metrics(&self, user_id: &str, portfolio_id: &str) -> Result<PortfolioMetrics>;
    async fn get_portfolio_allocation(
        &self,
        user_id: &str,
        portfolio_id: &str,
    ) -> Result<Vec<AllocationSlice>>;
    /// Values all of the user's portfolios with a single batch quote lookup.
    async fn get_dashboard_summary(&self, user_id: &str) -> Result<DashboardSummary>;
}
