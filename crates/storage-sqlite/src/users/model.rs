//! Database models for users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use finboard_core::users::{User, UserCredentials};

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUserDB {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            id: db.id,
            email: db.email,
            display_name: db.display_name,
            created_at: db.created_at,
        }
    }
}

impl From<UserDB> for UserCredentials {
    fn from(db: UserDB) -> Self {
        let password_hash = db.password_hash.clone();
        Self {
            user: db.into(),
            password_hash,
        }
    }
}
