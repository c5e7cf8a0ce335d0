//! SQLite storage implementation for portfolios and positions.

mod model;
mod repository;

pub use model::{NewPortfolioDB, PortfolioDB, PositionDB};
pub use repository::PortfolioRepository;
