use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use finboard_core::comparison::{
    ComparisonRepositoryTrait, ComparisonSelection, SelectionMutation,
};
use finboard_core::Result;

use super::model::ComparisonSelectionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::comparison_selections;

pub struct ComparisonRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ComparisonRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ComparisonRepository { pool, writer }
    }
}

fn find_selection(conn: &mut SqliteConnection, user_id: &str) -> Result<ComparisonSelection> {
    let row = comparison_selections::table
        .find(user_id)
        .select(ComparisonSelectionDB::as_select())
        .first::<ComparisonSelectionDB>(conn)
        .optional()
        .into_core()?;
    match row {
        Some(row) => Ok(row.into_selection()?),
        None => Ok(ComparisonSelection::new()),
    }
}

#[async_trait]
impl ComparisonRepositoryTrait for ComparisonRepository {
    fn get_selection(&self, user_id: &str) -> Result<ComparisonSelection> {
        let mut conn = get_connection(&self.pool)?;
        find_selection(&mut conn, user_id)
    }

    async fn update_selection(
        &self,
        user_id: &str,
        mutation: SelectionMutation,
    ) -> Result<(ComparisonSelection, bool)> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<(ComparisonSelection, bool)> {
                let mut selection = find_selection(conn, &user_id)?;
                if !mutation(&mut selection) {
                    return Ok((selection, false));
                }
                let row = ComparisonSelectionDB::from_selection(
                    &user_id,
                    &selection,
                    Utc::now().naive_utc(),
                )?;
                diesel::insert_into(comparison_selections::table)
                    .values(&row)
                    .on_conflict(comparison_selections::user_id)
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .into_core()?;
                Ok((selection, true))
            })
            .await
    }
}
