use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use finboard_core::errors::DatabaseError;
use finboard_core::users::{NewUserRecord, User, UserCredentials, UserRepositoryTrait};
use finboard_core::Result;

use super::model::{NewUserDB, UserDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::users;

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        UserRepository { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(UserCredentials::from))
    }

    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?
            .map(User::from)
            .ok_or_else(|| DatabaseError::NotFound(format!("User {}", user_id)).into())
    }

    async fn create(&self, record: NewUserRecord) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let now = Utc::now().naive_utc();
                let row = NewUserDB {
                    id: Uuid::new_v4().to_string(),
                    email: record.email,
                    display_name: record.display_name,
                    password_hash: record.password_hash,
                    created_at: now,
                    updated_at: now,
                };
                let created = diesel::insert_into(users::table)
                    .values(&row)
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(User::from(created))
            })
            .await
    }
}
