use async_trait::async_trait;

use crate::errors::Result;
use crate::watchlists::{NewWatchlist, Watchlist, WatchlistQuotes, WatchlistUpdate};

/// Edit applied to a stored watchlist. Returns whether anything changed;
/// an error aborts the update.
pub type WatchlistMutation = Box<dyn FnOnce(&mut Watchlist) -> Result<bool> + Send + 'static>;

/// Persistence for watchlists.
#[async_trait]
pub trait WatchlistRepositoryTrait: Send + Sync {
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Watchlist>>;
    fn get_by_id(&self, watchlist_id: &str) -> Result<Watchlist>;
    /// Inserts a watchlist unless the user already has `max_per_user`.
    /// The count and the insert happen in one write transaction.
    async fn create(
        &self,
        user_id: &str,
        new_watchlist: NewWatchlist,
        max_per_user: usize,
    ) -> Result<Watchlist>;
    /// Loads, mutates and stores a watchlist as a single write. Nothing is
    /// written when the mutation reports no change.
    async fn update(
        &self,
        watchlist_id: &str,
        mutation: WatchlistMutation,
    ) -> Result<(Watchlist, bool)>;
    async fn delete(&self, watchlist_id: &str) -> Result<usize>;
}

/// Watchlist operations scoped to the calling user.
#[async_trait]
pub trait WatchlistServiceTrait: Send + Sync {
    fn list_watchlists(&self, user_id: &str) -> Result<Vec<Watchlist>>;
    fn get_watchlist(&self, user_id: &str, watchlist_id: &str) -> Result<Watchlist>;
    async fn create_watchlist(&self, user_id: &str, new_watchlist: NewWatchlist) -> Result<Watchlist>;
    async fn rename_watchlist(
        &self,
        user_id: &str,
        watchlist_id: &str,
        update: WatchlistUpdate,
    ) -> Result<Watchlist>;
    async fn delete_watchlist(&self, user_id: &str, watchlist_id: &str) -> Result<()>;
    /// Adding a symbol already in the list is a no-op.
    async fn add_symbol(&self, user_id: &str, watchlist_id: &str, symbol: &str) -> Result<Watchlist>;
    async fn remove_symbol(&self, user_id: &str, watchlist_id: &str, symbol: &str) -> Result<Watchlist>;
    async fn get_watchlist_quotes(&self, user_id: &str, watchlist_id: &str) -> Result<WatchlistQuotes>;
}
