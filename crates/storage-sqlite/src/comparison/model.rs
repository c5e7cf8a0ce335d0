//! One row per user; entries are a JSON array of `{symbol, name, color}`.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use finboard_core::comparison::{ComparisonEntry, ComparisonSelection};

use crate::errors::StorageError;

#[derive(Queryable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::comparison_selections)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ComparisonSelectionDB {
    pub user_id: String,
    pub entries: String,
    pub updated_at: NaiveDateTime,
}

impl ComparisonSelectionDB {
    pub fn from_selection(
        user_id: &str,
        selection: &ComparisonSelection,
        updated_at: NaiveDateTime,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            user_id: user_id.to_string(),
            entries: serde_json::to_string(selection.entries())?,
            updated_at,
        })
    }

    /// Rebuilds the selection, re-applying the size limit and colours.
    pub fn into_selection(self) -> Result<ComparisonSelection, StorageError> {
        let entries: Vec<ComparisonEntry> = serde_json::from_str(&self.entries)?;
        Ok(ComparisonSelection::from_entries(entries))
    }
}
