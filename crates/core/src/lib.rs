//! Finboard Core - domain models, calculators and services.
//!
//! Everything here is storage-agnostic: services depend on repository traits
//! implemented by `finboard-storage-sqlite` and on the
//! `finboard_market_data::MarketDataProvider` trait for live prices.

pub mod comparison;
pub mod constants;
pub mod errors;
pub mod events;
pub mod portfolio;
pub mod symbols;
pub mod users;
pub mod validation;
pub mod watchlists;

// Re-export error types
pub use errors::{AuthError, DatabaseError, Error, Result, ValidationError};
