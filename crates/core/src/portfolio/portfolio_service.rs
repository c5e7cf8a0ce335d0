use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};

use finboard_market_data::{MarketDataProvider, Quote};

use super::allocation::{allocate, AllocationSlice};
use super::portfolio_model::{
    NewPortfolio, NewPosition, Portfolio, PortfolioUpdate, Position, PositionUpdate,
};
use super::portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use super::valuation::{aggregate, summarize, value_positions, DashboardSummary, PortfolioMetrics};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};

/// Portfolio CRUD plus live valuation.
pub struct PortfolioService {
    repository: Arc<dyn PortfolioRepositoryTrait>,
    market_data: Arc<dyn MarketDataProvider>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl PortfolioService {
    pub fn new(
        repository: Arc<dyn PortfolioRepositoryTrait>,
        market_data: Arc<dyn MarketDataProvider>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            market_data,
            event_sink,
        }
    }

    /// Loads a portfolio and checks ownership.
    fn owned_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio> {
        let portfolio = self.repository.get_by_id(portfolio_id)?;
        if !portfolio.is_owned_by(user_id) {
            return Err(Error::PermissionDenied(format!(
                "Portfolio {} does not belong to the current user",
                portfolio_id
            )));
        }
        Ok(portfolio)
    }

    /// Loads a position and checks it belongs to an owned portfolio.
    fn owned_position(&self, user_id: &str, portfolio_id: &str, position_id: &str) -> Result<Position> {
        self.owned_portfolio(user_id, portfolio_id)?;
        let position = self.repository.get_position(position_id)?;
        if position.portfolio_id != portfolio_id {
            return Err(Error::NotFound(format!(
                "Position {} in portfolio {}",
                position_id, portfolio_id
            )));
        }
        Ok(position)
    }

    /// Batch quote lookup. A failing provider yields an empty map so that
    /// valuation can still complete at purchase prices.
    async fn fetch_quotes(&self, symbols: &[String]) -> HashMap<String, Quote> {
        if symbols.is_empty() {
            return HashMap::new();
        }
        match self.market_data.get_quotes(symbols).await {
            Ok(quotes) => quotes.into_iter().map(|q| (q.symbol.clone(), q)).collect(),
            Err(e) => {
                warn!(
                    "Quote lookup for {} symbols failed, valuing at purchase price: {}",
                    symbols.len(),
                    e
                );
                HashMap::new()
            }
        }
    }

    async fn metrics_for(&self, portfolio: &Portfolio) -> PortfolioMetrics {
        let quotes = self.fetch_quotes(&portfolio.symbols()).await;
        aggregate(portfolio, value_positions(&portfolio.positions, &quotes))
    }
}

#[async_trait::async_trait]
impl PortfolioServiceTrait for PortfolioService {
    fn list_portfolios(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        self.repository.list_by_user(user_id)
    }

    fn get_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio> {
        self.owned_portfolio(user_id, portfolio_id)
    }

    async fn create_portfolio(&self, user_id: &str, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        new_portfolio.validate()?;
        let new_portfolio = NewPortfolio {
            name: new_portfolio.name.trim().to_string(),
            description: new_portfolio.description.map(|d| d.trim().to_string()),
        };
        let portfolio = self.repository.create(user_id, new_portfolio).await?;
        debug!("Created portfolio {} for user {}", portfolio.id, user_id);
        self.event_sink
            .emit(DomainEvent::portfolio_changed(user_id, &portfolio.id));
        Ok(portfolio)
    }

    async fn update_portfolio(
        &self,
        user_id: &str,
        portfolio_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio> {
        update.validate()?;
        self.owned_portfolio(user_id, portfolio_id)?;
        let update = PortfolioUpdate {
            name: update.name.trim().to_string(),
            description: update.description.map(|d| d.trim().to_string()),
        };
        let portfolio = self.repository.update(portfolio_id, update).await?;
        self.event_sink
            .emit(DomainEvent::portfolio_changed(user_id, portfolio_id));
        Ok(portfolio)
    }

    async fn delete_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<()> {
        self.owned_portfolio(user_id, portfolio_id)?;
        self.repository.delete(portfolio_id).await?;
        debug!("Deleted portfolio {}", portfolio_id);
        self.event_sink
            .emit(DomainEvent::portfolio_deleted(user_id, portfolio_id));
        Ok(())
    }

    async fn add_position(
        &self,
        user_id: &str,
        portfolio_id: &str,
        new_position: NewPosition,
    ) -> Result<Position> {
        let new_position = new_position.validated(Utc::now().date_naive())?;
        self.owned_portfolio(user_id, portfolio_id)?;
        let position = self
            .repository
            .insert_position(portfolio_id, new_position)
            .await?;
        self.event_sink.emit(DomainEvent::positions_changed(
            user_id,
            portfolio_id,
            vec![position.symbol.clone()],
        ));
        Ok(position)
    }

    async fn update_position(
        &self,
        user_id: &str,
        portfolio_id: &str,
        position_id: &str,
        update: PositionUpdate,
    ) -> Result<Position> {
        let update = update.validated(Utc::now().date_naive())?;
        let mut position = self.owned_position(user_id, portfolio_id, position_id)?;
        if update.is_empty() {
            return Ok(position);
        }
        update.apply_to(&mut position);
        position.updated_at = Utc::now().naive_utc();
        let saved = self.repository.save_position(position).await?;
        self.event_sink.emit(DomainEvent::positions_changed(
            user_id,
            portfolio_id,
            vec![saved.symbol.clone()],
        ));
        Ok(saved)
    }

    async fn remove_position(&self, user_id: &str, portfolio_id: &str, position_id: &str) -> Result<()> {
        let position = self.owned_position(user_id, portfolio_id, position_id)?;
        self.repository.delete_position(position_id).await?;
        self.event_sink.emit(DomainEvent::positions_changed(
            user_id,
            portfolio_id,
            vec![position.symbol],
        ));
        Ok(())
    }

    async fn get_portfolio_metrics(&self, user_id: &str, portfolio_id: &str) -> Result<PortfolioMetrics> {
        let portfolio = self.owned_portfolio(user_id, portfolio_id)?;
        Ok(self.metrics_for(&portfolio).await)
    }

    async fn get_portfolio_allocation(
        &self,
        user_id: &str,
        portfolio_id: &str,
    ) -> Result<Vec<AllocationSlice>> {
        let metrics = self.get_portfolio_metrics(user_id, portfolio_id).await?;
        Ok(allocate(&metrics.positions))
    }

    async fn get_dashboard_summary(&self, user_id: &str) -> Result<DashboardSummary> {
        let portfolios = self.repository.list_by_user(user_id)?;

        let mut symbols: Vec<String> = Vec::new();
        for symbol in portfolios.iter().flat_map(|p| p.symbols()) {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        let quotes = self.fetch_quotes(&symbols).await;

        let metrics = portfolios
            .iter()
            .map(|p| aggregate(p, value_positions(&p.positions, &quotes)))
            .collect();
        Ok(summarize(metrics))
    }
}
