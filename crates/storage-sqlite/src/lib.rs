//! SQLite storage implementation for Finboard.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `finboard-core` and contains:
//! - Database connection pooling and management
//! - Embedded Diesel migrations
//! - Repository implementations for users, portfolios, watchlists and comparison selections
//! - Database-specific model types (with Diesel derives)
//!
//! All writes are serialized through the writer actor in [`db::write_actor`].

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod comparison;
pub mod portfolios;
pub mod users;
pub mod watchlists;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool, WriteHandle};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from finboard-core for convenience
pub use finboard_core::errors::{DatabaseError, Error, Result};
