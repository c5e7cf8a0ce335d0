//! Users and sessions.
//!
//! Password hashing and token signing live in the server; this module holds
//! the account models and the contracts the server implements.

mod users_model;
mod users_traits;

#[cfg(test)]
mod users_model_tests;

pub use users_model::*;
pub use users_traits::{AuthServiceTrait, UserRepositoryTrait};
