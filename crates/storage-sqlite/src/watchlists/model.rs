//! Database model for watchlists. Symbols are kept as a JSON array.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use finboard_core::watchlists::Watchlist;

use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::watchlists)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WatchlistDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub symbols: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Watchlist> for WatchlistDB {
    type Error = StorageError;

    fn try_from(domain: Watchlist) -> Result<Self, Self::Error> {
        Ok(Self {
            symbols: serde_json::to_string(&domain.symbols)?,
            id: domain.id,
            user_id: domain.user_id,
            name: domain.name,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        })
    }
}

impl TryFrom<WatchlistDB> for Watchlist {
    type Error = StorageError;

    fn try_from(db: WatchlistDB) -> Result<Self, Self::Error> {
        Ok(Self {
            symbols: serde_json::from_str(&db.symbols)?,
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}
