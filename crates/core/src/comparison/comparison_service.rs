use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};

use finboard_market_data::{ChartRange, MarketDataProvider};

use super::comparison_calculator::normalize_series;
use super::comparison_model::{ComparisonChart, ComparisonSelection, ComparisonSeries};
use super::comparison_traits::{ComparisonRepositoryTrait, ComparisonServiceTrait, SelectionMutation};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::symbols::normalize_symbol;

/// Service for the stock comparison view.
pub struct ComparisonService {
    repository: Arc<dyn ComparisonRepositoryTrait>,
    market_data: Arc<dyn MarketDataProvider>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl ComparisonService {
    pub fn new(
        repository: Arc<dyn ComparisonRepositoryTrait>,
        market_data: Arc<dyn MarketDataProvider>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            market_data,
            event_sink,
        }
    }

    async fn update(&self, user_id: &str, mutation: SelectionMutation) -> Result<ComparisonSelection> {
        let (selection, changed) = self.repository.update_selection(user_id, mutation).await?;
        if changed {
            self.event_sink.emit(DomainEvent::comparison_changed(user_id));
        }
        Ok(selection)
    }

    /// Display name from the quote, falling back to the ticker itself.
    async fn lookup_name(&self, symbol: &str) -> String {
        match self.market_data.get_quote(symbol).await {
            Ok(quote) => quote.name.unwrap_or_else(|| symbol.to_string()),
            Err(e) => {
                warn!("Name lookup for {} failed: {}", symbol, e);
                symbol.to_string()
            }
        }
    }
}

#[async_trait::async_trait]
impl ComparisonServiceTrait for ComparisonService {
    fn get_selection(&self, user_id: &str) -> Result<ComparisonSelection> {
        self.repository.get_selection(user_id)
    }

    async fn add_symbol(
        &self,
        user_id: &str,
        symbol: &str,
        name: Option<String>,
    ) -> Result<ComparisonSelection> {
        let symbol = normalize_symbol(symbol)?;
        let selection = self.repository.get_selection(user_id)?;
        if selection.is_full() || selection.contains(&symbol) {
            debug!("Comparison selection unchanged for {}", symbol);
            return Ok(selection);
        }

        let name = match name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => self.lookup_name(&symbol).await,
        };
        // The selection may have changed during the lookup; `add` re-checks.
        self.update(
            user_id,
            Box::new(move |selection: &mut ComparisonSelection| selection.add(&symbol, &name)),
        )
        .await
    }

    async fn remove_symbol(&self, user_id: &str, symbol: &str) -> Result<ComparisonSelection> {
        let symbol = normalize_symbol(symbol)?;
        self.update(
            user_id,
            Box::new(move |selection: &mut ComparisonSelection| selection.remove(&symbol)),
        )
        .await
    }

    async fn clear(&self, user_id: &str) -> Result<ComparisonSelection> {
        self.update(
            user_id,
            Box::new(|selection: &mut ComparisonSelection| {
                if selection.is_empty() {
                    return false;
                }
                selection.clear();
                true
            }),
        )
        .await
    }

    async fn compare(&self, user_id: &str, range: ChartRange) -> Result<ComparisonChart> {
        let selection = self.repository.get_selection(user_id)?;
        if selection.is_empty() {
            return Ok(ComparisonChart {
                range,
                series: Vec::new(),
            });
        }

        let symbols = selection.symbols();
        let histories = join_all(
            symbols
                .iter()
                .map(|symbol| self.market_data.get_history(symbol, range)),
        )
        .await;
        let quotes = self.market_data.get_quotes(&symbols).await?;

        let mut series = Vec::with_capacity(selection.len());
        for (entry, history) in selection.entries().iter().zip(histories) {
            let points = match history {
                Ok(bars) => normalize_series(&bars),
                Err(e) if e.is_terminal() => {
                    warn!("No {} history for {}: {}", range, entry.symbol, e);
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            };
            series.push(ComparisonSeries {
                symbol: entry.symbol.clone(),
                name: entry.name.clone(),
                color: entry.color.clone(),
                points,
                quote: quotes.iter().find(|q| q.symbol == entry.symbol).cloned(),
            });
        }

        Ok(ComparisonChart { range, series })
    }
}
