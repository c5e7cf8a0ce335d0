//! Database models for portfolios and positions.
//!
//! Share counts and prices are stored as TEXT so they round-trip exactly.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;

use finboard_core::portfolio::{Portfolio, Position};

use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolios)]
pub struct NewPortfolioDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Associations, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(belongs_to(PortfolioDB, foreign_key = portfolio_id))]
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct PositionDB {
    pub id: String,
    pub portfolio_id: String,
    pub symbol: String,
    pub shares: String,
    pub purchase_price: String,
    pub purchase_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Position> for PositionDB {
    fn from(domain: Position) -> Self {
        Self {
            id: domain.id,
            portfolio_id: domain.portfolio_id,
            symbol: domain.symbol,
            shares: domain.shares.to_string(),
            purchase_price: domain.purchase_price.to_string(),
            purchase_date: domain.purchase_date,
            notes: domain.notes,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl TryFrom<PositionDB> for Position {
    type Error = StorageError;

    fn try_from(db: PositionDB) -> Result<Self, Self::Error> {
        Ok(Self {
            shares: Decimal::from_str(&db.shares)?,
            purchase_price: Decimal::from_str(&db.purchase_price)?,
            id: db.id,
            portfolio_id: db.portfolio_id,
            symbol: db.symbol,
            purchase_date: db.purchase_date,
            notes: db.notes,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl PortfolioDB {
    pub fn into_domain(self, positions: Vec<Position>) -> Portfolio {
        Portfolio {
            id: self.id,
            name: self.name,
            description: self.description,
            user_id: self.user_id,
            positions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
