//! Shared input checks.

use crate::constants::MAX_NAME_LENGTH;
use crate::{Error, Result};

/// Names are trimmed before checking and must hold 1 to 50 characters.
pub fn validate_name(name: &str, what: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input(format!("{} name cannot be empty", what)));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::invalid_input(format!(
            "{} name cannot exceed {} characters",
            what, MAX_NAME_LENGTH
        )));
    }
    Ok(())
}
