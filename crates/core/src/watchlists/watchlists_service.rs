use std::sync::Arc;

use log::debug;

use finboard_market_data::MarketDataProvider;

use super::watchlists_model::{NewWatchlist, Watchlist, WatchlistQuotes, WatchlistUpdate};
use super::watchlists_traits::{WatchlistMutation, WatchlistRepositoryTrait, WatchlistServiceTrait};
use crate::constants::MAX_WATCHLISTS_PER_USER;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::symbols::normalize_symbol;
use crate::validation::validate_name;

fn ensure_owner(watchlist: &Watchlist, user_id: &str) -> Result<()> {
    if !watchlist.is_owned_by(user_id) {
        return Err(Error::PermissionDenied(format!(
            "Watchlist {} does not belong to the current user",
            watchlist.id
        )));
    }
    Ok(())
}

/// Service for managing watchlists.
pub struct WatchlistService {
    repository: Arc<dyn WatchlistRepositoryTrait>,
    market_data: Arc<dyn MarketDataProvider>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl WatchlistService {
    pub fn new(
        repository: Arc<dyn WatchlistRepositoryTrait>,
        market_data: Arc<dyn MarketDataProvider>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            market_data,
            event_sink,
        }
    }

    fn owned_watchlist(&self, user_id: &str, watchlist_id: &str) -> Result<Watchlist> {
        let watchlist = self.repository.get_by_id(watchlist_id)?;
        ensure_owner(&watchlist, user_id)?;
        Ok(watchlist)
    }

    /// Runs `edit` on the caller's watchlist inside one repository write.
    async fn update_owned<F>(&self, user_id: &str, watchlist_id: &str, edit: F) -> Result<Watchlist>
    where
        F: FnOnce(&mut Watchlist) -> Result<bool> + Send + 'static,
    {
        let owner = user_id.to_string();
        let mutation: WatchlistMutation = Box::new(move |watchlist: &mut Watchlist| {
            ensure_owner(watchlist, &owner)?;
            edit(watchlist)
        });
        let (watchlist, changed) = self.repository.update(watchlist_id, mutation).await?;
        if changed {
            self.event_sink
                .emit(DomainEvent::watchlist_changed(user_id, &watchlist.id));
        } else {
            debug!("Watchlist {} unchanged", watchlist_id);
        }
        Ok(watchlist)
    }
}

#[async_trait::async_trait]
impl WatchlistServiceTrait for WatchlistService {
    fn list_watchlists(&self, user_id: &str) -> Result<Vec<Watchlist>> {
        self.repository.list_by_user(user_id)
    }

    fn get_watchlist(&self, user_id: &str, watchlist_id: &str) -> Result<Watchlist> {
        self.owned_watchlist(user_id, watchlist_id)
    }

    async fn create_watchlist(&self, user_id: &str, new_watchlist: NewWatchlist) -> Result<Watchlist> {
        let new_watchlist = new_watchlist.validated()?;
        let watchlist = self
            .repository
            .create(user_id, new_watchlist, MAX_WATCHLISTS_PER_USER)
            .await?;
        debug!("Created watchlist {} for user {}", watchlist.id, user_id);
        self.event_sink
            .emit(DomainEvent::watchlist_changed(user_id, &watchlist.id));
        Ok(watchlist)
    }

    async fn rename_watchlist(
        &self,
        user_id: &str,
        watchlist_id: &str,
        update: WatchlistUpdate,
    ) -> Result<Watchlist> {
        validate_name(&update.name, "Watchlist")?;
        let name = update.name.trim().to_string();
        self.update_owned(user_id, watchlist_id, move |watchlist| {
            if watchlist.name == name {
                return Ok(false);
            }
            watchlist.name = name;
            Ok(true)
        })
        .await
    }

    async fn delete_watchlist(&self, user_id: &str, watchlist_id: &str) -> Result<()> {
        self.owned_watchlist(user_id, watchlist_id)?;
        self.repository.delete(watchlist_id).await?;
        self.event_sink
            .emit(DomainEvent::watchlist_deleted(user_id, watchlist_id));
        Ok(())
    }

    async fn add_symbol(&self, user_id: &str, watchlist_id: &str, symbol: &str) -> Result<Watchlist> {
        let symbol = normalize_symbol(symbol)?;
        self.update_owned(user_id, watchlist_id, move |watchlist| {
            watchlist.add_symbol(&symbol)
        })
        .await
    }

    async fn remove_symbol(&self, user_id: &str, watchlist_id: &str, symbol: &str) -> Result<Watchlist> {
        let symbol = normalize_symbol(symbol)?;
        self.update_owned(user_id, watchlist_id, move |watchlist| {
            Ok(watchlist.remove_symbol(&symbol))
        })
        .await
    }

    async fn get_watchlist_quotes(&self, user_id: &str, watchlist_id: &str) -> Result<WatchlistQuotes> {
        let watchlist = self.owned_watchlist(user_id, watchlist_id)?;
        let fetched = if watchlist.symbols.is_empty() {
            Vec::new()
        } else {
            self.market_data.get_quotes(&watchlist.symbols).await?
        };

        let mut quotes = Vec::with_capacity(watchlist.symbols.len());
        let mut unavailable = Vec::new();
        for symbol in &watchlist.symbols {
            match fetched.iter().find(|q| &q.symbol == symbol) {
                Some(quote) => quotes.push(quote.clone()),
                None => unavailable.push(symbol.clone()),
            }
        }

        Ok(WatchlistQuotes {
            watchlist_id: watchlist.id,
            quotes,
            unavailable,
        })
    }
}
