//! Side-by-side stock comparison.

mod comparison_calculator;
mod comparison_model;
mod comparison_service;
mod comparison_traits;


pub use comparison_calculator::normalize_series;
pub use comparison_model::*;
pub use comparison_service::ComparisonService;
pub use comparison_traits::{ComparisonRepositoryTrait, ComparisonServiceTrait, SelectionMutation};
