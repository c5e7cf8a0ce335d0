use async_trait::async_trait;

use finboard_market_data::ChartRange;

use crate::comparison::{ComparisonChart, ComparisonSelection};
use crate::errors::Result;

/// Edit applied to a stored selection; returns whether it changed anything.
pub type SelectionMutation = Box<dyn FnOnce(&mut ComparisonSelection) -> bool + Send + 'static>;

/// Per-user storage of the comparison selection.
#[async_trait]
pub trait ComparisonRepositoryTrait: Send + Sync {
    /// Returns an empty selection for users who never saved one.
    fn get_selection(&self, user_id: &str) -> Result<ComparisonSelection>;
    /// Reads, mutates and upserts the selection in one write transaction.
    async fn update_selection(
        &self,
        user_id: &str,
        mutation: SelectionMutation,
    ) -> Result<(ComparisonSelection, bool)>;
}

#[async_trait]
pub trait ComparisonServiceTrait: Send + Sync {
    fn get_selection(&self, user_id: &str) -> Result<ComparisonSelection>;
    /// Adds a symbol. A full selection or a duplicate leaves it unchanged.
    /// Without a `name` the quote's display name is looked up.
    async fn add_symbol(
        &self,
        user_id: &str,
        symbol: &str,
        name: Option<String>,
    ) -> Result<ComparisonSelection>;
    async fn remove_symbol(&self, user_id: &str, symbol: &str) -> Result<ComparisonSelection>;
    async fn clear(&self, user_id: &str) -> Result<ComparisonSelection>;
    /// Fetches history for every selected symbol concurrently and normalizes it.
    async fn compare(&self, user_id: &str, range: ChartRange) -> Result<ComparisonChart>;
}
