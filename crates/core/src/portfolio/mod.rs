//! Portfolios, positions, valuation and allocation.

pub mod allocation;
pub mod valuation;

mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;

#[cfg(test)]
mod portfolio_model_tests;

#[cfg(test)]
mod portfolio_service_tests;

pub use portfolio_model::*;
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
