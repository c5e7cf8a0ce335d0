use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use finboard_core::errors::{DatabaseError, Error};
use finboard_core::watchlists::{
    NewWatchlist, Watchlist, WatchlistMutation, WatchlistRepositoryTrait,
};
use finboard_core::Result;

use super::model::WatchlistDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::watchlists;

pub struct WatchlistRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WatchlistRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        WatchlistRepository { pool, writer }
    }
}

fn find_watchlist(conn: &mut SqliteConnection, watchlist_id: &str) -> Result<Watchlist> {
    let row = watchlists::table
        .find(watchlist_id)
        .select(WatchlistDB::as_select())
        .first::<WatchlistDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| DatabaseError::NotFound(format!("Watchlist {}", watchlist_id)))?;
    Ok(Watchlist::try_from(row)?)
}

#[async_trait]
impl WatchlistRepositoryTrait for WatchlistRepository {
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Watchlist>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = watchlists::table
            .filter(watchlists::user_id.eq(user_id))
            .select(WatchlistDB::as_select())
            .order((watchlists::created_at.asc(), watchlists::id.asc()))
            .load::<WatchlistDB>(&mut conn)
            .into_core()?;
        rows.into_iter()
            .map(|row| Ok(Watchlist::try_from(row)?))
            .collect()
    }

    fn get_by_id(&self, watchlist_id: &str) -> Result<Watchlist> {
        let mut conn = get_connection(&self.pool)?;
        find_watchlist(&mut conn, watchlist_id)
    }

    async fn create(
        &self,
        user_id: &str,
        new_watchlist: NewWatchlist,
        max_per_user: usize,
    ) -> Result<Watchlist> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Watchlist> {
                let existing: i64 = watchlists::table
                    .filter(watchlists::user_id.eq(&user_id))
                    .count()
                    .get_result(conn)
                    .into_core()?;
                if existing as usize >= max_per_user {
                    return Err(Error::LimitExceeded(format!(
                        "A user can have at most {} watchlists",
                        max_per_user
                    )));
                }
                let now = Utc::now().naive_utc();
                let row = WatchlistDB::try_from(Watchlist {
                    id: Uuid::new_v4().to_string(),
                    name: new_watchlist.name,
                    user_id,
                    symbols: new_watchlist.symbols,
                    created_at: now,
                    updated_at: now,
                })?;
                let created = diesel::insert_into(watchlists::table)
                    .values(&row)
                    .returning(WatchlistDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(Watchlist::try_from(created)?)
            })
            .await
    }

    async fn update(
        &self,
        watchlist_id: &str,
        mutation: WatchlistMutation,
    ) -> Result<(Watchlist, bool)> {
        let watchlist_id = watchlist_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<(Watchlist, bool)> {
                let mut watchlist = find_watchlist(conn, &watchlist_id)?;
                if !mutation(&mut watchlist)? {
                    return Ok((watchlist, false));
                }
                let symbols = serde_json::to_string(&watchlist.symbols).map_err(StorageError::from)?;
                let saved = diesel::update(watchlists::table.find(&watchlist.id))
                    .set((
                        watchlists::name.eq(&watchlist.name),
                        watchlists::symbols.eq(symbols),
                        watchlists::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .returning(WatchlistDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| DatabaseError::NotFound(format!("Watchlist {}", watchlist.id)))?;
                Ok((Watchlist::try_from(saved)?, true))
            })
            .await
    }

    async fn delete(&self, watchlist_id: &str) -> Result<usize> {
        let watchlist_id = watchlist_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(watchlists::table.find(watchlist_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }
}
