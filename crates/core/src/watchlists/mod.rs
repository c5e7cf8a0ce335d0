//! Watchlists - capped symbol lists per user.

mod watchlists_model;
mod watchlists_service;
mod watchlists_traits;


pub use watchlists_model::*;
pub use watchlists_service::WatchlistService;
pub use watchlists_traits::{WatchlistMutation, WatchlistRepositoryTrait, WatchlistServiceTrait};
