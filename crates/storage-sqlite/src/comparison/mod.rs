//! SQLite storage implementation for comparison selections.

mod model;
mod repository;

pub use model::ComparisonSelectionDB;
pub use repository::ComparisonRepository;
