//! Storage-specific error types for SQLite operations.
//!
//! Diesel and r2d2 errors are wrapped here and converted to the
//! database-agnostic types in `finboard_core` before leaving the crate.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use finboard_core::errors::{DatabaseError, Error};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A core error raised inside a write job; passed back unchanged.
    #[error("{0}")]
    Core(Box<Error>),
}

impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::Core(Box::new(err))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<rust_decimal::Error> for StorageError {
    fn from(err: rust_decimal::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => Error::Database(DatabaseError::ConnectionFailed(e.to_string())),
            StorageError::QueryFailed(DieselError::NotFound) => {
                Error::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => Error::Database(DatabaseError::UniqueViolation(info.message().to_string())),
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                info,
            )) => Error::Database(DatabaseError::ForeignKeyViolation(info.message().to_string())),
            StorageError::QueryFailed(e) => Error::Database(DatabaseError::QueryFailed(e.to_string())),
            StorageError::SerializationError(e) => Error::Database(DatabaseError::Internal(e)),
            StorageError::Core(e) => *e,
        }
    }
}

/// Adds `.into_core()` to Diesel and r2d2 results.
pub trait IntoCore<T> {
    fn into_core(self) -> finboard_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> finboard_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> finboard_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
