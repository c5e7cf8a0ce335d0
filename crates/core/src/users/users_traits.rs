use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::errors::Result;
use crate::users::{
    AuthEvent, AuthSession, AuthUser, NewUser, NewUserRecord, SignInRequest, User,
    UserCredentials,
};

/// Persistence for accounts.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Looks up by normalized (lowercase) email.
    fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>>;
    fn get_by_id(&self, user_id: &str) -> Result<User>;
    /// Fails with a unique violation when the email is taken.
    async fn create(&self, record: NewUserRecord) -> Result<User>;
}

/// Account and session operations.
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn register(&self, new_user: NewUser) -> Result<AuthSession>;
    async fn sign_in(&self, request: SignInRequest) -> Result<AuthSession>;
    async fn sign_out(&self, auth: &AuthUser) -> Result<()>;
    /// Resolves a bearer token to a live session.
    fn authenticate(&self, token: &str) -> Result<AuthUser>;
    fn current_user(&self, auth: &AuthUser) -> Result<User>;
    /// Session-listen: every sign-in and sign-out is published here.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
