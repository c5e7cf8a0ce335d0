//! Account, session and auth event models.

use chrono::{DateTime, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH};
use crate::{Error, Result};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex pattern");
}

/// A registered account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A user together with the stored password hash, as loaded for sign-in.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl NewUser {
    /// Returns the input with a lowercased email and a trimmed display name.
    /// The password is checked but left untouched.
    pub fn validated(self) -> Result<Self> {
        let email = normalize_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::invalid_input(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let display_name = match self.display_name {
            Some(name) => {
                let trimmed = name.trim();
                if trimmed.chars().count() > MAX_NAME_LENGTH {
                    return Err(Error::invalid_input(format!(
                        "Display name cannot exceed {} characters",
                        MAX_NAME_LENGTH
                    )));
                }
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            None => None,
        };
        Ok(Self {
            email,
            display_name,
            ..self
        })
    }
}

/// What the repository persists for a new account.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// A live sign-in. Revoked on sign-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Returned by register and sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// The caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub session_id: String,
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AuthEvent {
    SignedIn { user_id: String, session_id: String },
    SignedOut { user_id: String, session_id: String },
}

impl AuthEvent {
    pub fn user_id(&self) -> &str {
        match self {
            AuthEvent::SignedIn { user_id, .. } | AuthEvent::SignedOut { user_id, .. } => user_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn { .. } => "signed_in",
            AuthEvent::SignedOut { .. } => "signed_out",
        }
    }
}

/// Trims and lowercases an email address after checking its shape.
pub fn normalize_email(input: &str) -> Result<String> {
    let email = input.trim().to_lowercase();
    if !EMAIL_REGEX.is_match(&email) {
        return Err(Error::invalid_input("Invalid email address"));
    }
    Ok(email)
}
