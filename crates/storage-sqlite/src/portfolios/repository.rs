use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use finboard_core::errors::DatabaseError;
use finboard_core::portfolio::{
    NewPortfolio, NewPosition, Portfolio, PortfolioRepositoryTrait, PortfolioUpdate, Position,
};
use finboard_core::Result;

use super::model::{NewPortfolioDB, PortfolioDB, PositionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{portfolios, positions};

pub struct PortfolioRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PortfolioRepository { pool, writer }
    }
}

fn not_found(what: &str, id: &str) -> finboard_core::Error {
    DatabaseError::NotFound(format!("{} {}", what, id)).into()
}

fn to_positions(rows: Vec<PositionDB>) -> Result<Vec<Position>> {
    rows.into_iter()
        .map(|row| Position::try_from(row).map_err(finboard_core::Error::from))
        .collect()
}

/// Loads the given portfolio rows with their positions, oldest position first.
fn with_positions(conn: &mut SqliteConnection, rows: Vec<PortfolioDB>) -> Result<Vec<Portfolio>> {
    let position_rows = PositionDB::belonging_to(&rows)
        .select(PositionDB::as_select())
        .order((positions::created_at.asc(), positions::id.asc()))
        .load::<PositionDB>(conn)
        .into_core()?;

    let mut by_portfolio: HashMap<String, Vec<PositionDB>> = HashMap::new();
    for row in position_rows {
        by_portfolio.entry(row.portfolio_id.clone()).or_default().push(row);
    }

    rows.into_iter()
        .map(|portfolio| {
            let held = by_portfolio.remove(&portfolio.id).unwrap_or_default();
            Ok(portfolio.into_domain(to_positions(held)?))
        })
        .collect()
}

fn load_portfolio(conn: &mut SqliteConnection, portfolio_id: &str) -> Result<Portfolio> {
    let row = portfolios::table
        .find(portfolio_id)
        .select(PortfolioDB::as_select())
        .first::<PortfolioDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| not_found("Portfolio", portfolio_id))?;
    with_positions(conn, vec![row])?
        .pop()
        .ok_or_else(|| not_found("Portfolio", portfolio_id))
}

fn load_position(conn: &mut SqliteConnection, position_id: &str) -> Result<Position> {
    let row = positions::table
        .find(position_id)
        .select(PositionDB::as_select())
        .first::<PositionDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| not_found("Position", position_id))?;
    Ok(Position::try_from(row)?)
}

#[async_trait]
impl PortfolioRepositoryTrait for PortfolioRepository {
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = portfolios::table
            .filter(portfolios::user_id.eq(user_id))
            .select(PortfolioDB::as_select())
            .order((portfolios::created_at.asc(), portfolios::id.asc()))
            .load::<PortfolioDB>(&mut conn)
            .into_core()?;
        with_positions(&mut conn, rows)
    }

    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;
        load_portfolio(&mut conn, portfolio_id)
    }

    async fn create(&self, user_id: &str, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let now = Utc::now().naive_utc();
                let row = NewPortfolioDB {
                    id: Uuid::new_v4().to_string(),
                    user_id,
                    name: new_portfolio.name,
                    description: new_portfolio.description,
                    created_at: now,
                    updated_at: now,
                };
                let created = diesel::insert_into(portfolios::table)
                    .values(&row)
                    .returning(PortfolioDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(created.into_domain(Vec::new()))
            })
            .await
    }

    async fn update(&self, portfolio_id: &str, update: PortfolioUpdate) -> Result<Portfolio> {
        let portfolio_id = portfolio_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let affected = diesel::update(portfolios::table.find(&portfolio_id))
                    .set((
                        portfolios::name.eq(update.name),
                        portfolios::description.eq(update.description),
                        portfolios::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .into_core()?;
                if affected == 0 {
                    return Err(not_found("Portfolio", &portfolio_id));
                }
                load_portfolio(conn, &portfolio_id)
            })
            .await
    }

    async fn delete(&self, portfolio_id: &str) -> Result<usize> {
        let portfolio_id = portfolio_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(portfolios::table.find(portfolio_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    fn get_position(&self, position_id: &str) -> Result<Position> {
        let mut conn = get_connection(&self.pool)?;
        load_position(&mut conn, position_id)
    }

    async fn insert_position(&self, portfolio_id: &str, new_position: NewPosition) -> Result<Position> {
        let portfolio_id = portfolio_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Position> {
                let now = Utc::now().naive_utc();
                let row = PositionDB::from(Position {
                    id: Uuid::new_v4().to_string(),
                    portfolio_id: portfolio_id.clone(),
                    symbol: new_position.symbol,
                    shares: new_position.shares,
                    purchase_price: new_position.purchase_price,
                    purchase_date: new_position.purchase_date,
                    notes: new_position.notes,
                    created_at: now,
                    updated_at: now,
                });
                let created = diesel::insert_into(positions::table)
                    .values(&row)
                    .returning(PositionDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                touch_portfolio(conn, &portfolio_id)?;
                Ok(Position::try_from(created)?)
            })
            .await
    }

    async fn save_position(&self, position: Position) -> Result<Position> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Position> {
                let row = PositionDB::from(position);
                let saved = diesel::update(positions::table.find(&row.id))
                    .set(&row)
                    .returning(PositionDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| not_found("Position", &row.id))?;
                touch_portfolio(conn, &saved.portfolio_id)?;
                Ok(Position::try_from(saved)?)
            })
            .await
    }

    async fn delete_position(&self, position_id: &str) -> Result<usize> {
        let position_id = position_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let portfolio_id = positions::table
                    .find(&position_id)
                    .select(positions::portfolio_id)
                    .first::<String>(conn)
                    .optional()
                    .into_core()?;
                let deleted = diesel::delete(positions::table.find(&position_id))
                    .execute(conn)
                    .into_core()?;
                if let Some(portfolio_id) = portfolio_id {
                    touch_portfolio(conn, &portfolio_id)?;
                }
                Ok(deleted)
            })
            .await
    }
}

/// Position changes bump the owning portfolio's `updated_at`.
fn touch_portfolio(conn: &mut SqliteConnection, portfolio_id: &str) -> Result<()> {
    diesel::update(portfolios::table.find(portfolio_id))
        .set(portfolios::updated_at.eq(Utc::now().naive_utc()))
        .execute(conn)
        .into_core()?;
    Ok(())
}
