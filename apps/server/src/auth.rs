use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use argon2::{
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use finboard_core::errors::{AuthError, DatabaseError, Error, Result};
use finboard_core::users::{
    AuthEvent, AuthServiceTrait, AuthSession, AuthUser, NewUser, NewUserRecord, Session,
    SignInRequest, User, UserRepositoryTrait,
};

use crate::error::ApiError;
use crate::main_lib::AppState;

const AUTH_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    sid: String,
    exp: usize,
    iat: usize,
}

/// Password accounts with HS256 bearer tokens.
///
/// Tokens carry the session id; a token is only accepted while its session
/// is held here, so sign-out revokes it before `exp`.
pub struct AuthService {
    users: Arc<dyn UserRepositoryTrait>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepositoryTrait>, jwt_secret: &[u8], token_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            users,
            encoding_key: EncodingKey::from_secret(jwt_secret),
            decoding_key: DecodingKey::from_secret(jwt_secret),
            validation,
            token_ttl,
            sessions: RwLock::new(HashMap::new()),
            events,
        }
    }

    fn sessions_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Session table lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn sessions_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Session table lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Unexpected(format!("Password hashing failed: {e}")))
    }

    fn verify_password(candidate: &str, stored_hash: &str) -> Result<()> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| Error::Unexpected(format!("Stored password hash is invalid: {e}")))?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => AuthError::InvalidCredentials.into(),
                other => Error::Unexpected(format!("Password verification failed: {other}")),
            })
    }

    /// Opens a session for `user` and signs its token.
    fn open_session(&self, user: User) -> Result<AuthSession> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.token_ttl)
            .map_err(|e| Error::Unexpected(format!("Token lifetime out of range: {e}")))?;
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            expires_at: now + ttl,
        };
        let claims = Claims {
            sub: user.id.clone(),
            sid: session.id.clone(),
            iat: now.timestamp() as usize,
            exp: session.expires_at.timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Unexpected(format!("Failed to sign token: {e}")))?;

        let event = AuthEvent::SignedIn {
            user_id: user.id.clone(),
            session_id: session.id.clone(),
        };
        let expires_at = session.expires_at;
        let mut sessions = self.sessions_write();
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(session.id.clone(), session);
        drop(sessions);
        // No listeners is fine.
        let _ = self.events.send(event);

        Ok(AuthSession {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_at,
            user,
        })
    }

    fn prune_expired(&self, now: DateTime<Utc>) {
        self.sessions_write().retain(|_, s| !s.is_expired_at(now));
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions_read().len()
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn register(&self, new_user: NewUser) -> Result<AuthSession> {
        let new_user = new_user.validated()?;
        if self.users.find_by_email(&new_user.email)?.is_some() {
            return Err(AuthError::EmailTaken.into());
        }
        let record = NewUserRecord {
            email: new_user.email,
            display_name: new_user.display_name,
            password_hash: Self::hash_password(&new_user.password)?,
        };
        let user = match self.users.create(record).await {
            Ok(user) => user,
            // Lost a race with a concurrent registration.
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                return Err(AuthError::EmailTaken.into())
            }
            Err(e) => return Err(e),
        };
        tracing::info!("Registered user {}", user.id);
        self.open_session(user)
    }

    async fn sign_in(&self, request: SignInRequest) -> Result<AuthSession> {
        let email = request.email.trim().to_lowercase();
        let credentials = self
            .users
            .find_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;
        Self::verify_password(&request.password, &credentials.password_hash)?;
        self.open_session(credentials.user)
    }

    async fn sign_out(&self, auth: &AuthUser) -> Result<()> {
        let removed = self.sessions_write().remove(&auth.session_id);
        if removed.is_some() {
            let _ = self.events.send(AuthEvent::SignedOut {
                user_id: auth.user_id.clone(),
                session_id: auth.session_id.clone(),
            });
        }
        Ok(())
    }

    fn authenticate(&self, token: &str) -> Result<AuthUser> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::InvalidToken,
            })?
            .claims;

        let now = Utc::now();
        let live = self
            .sessions_read()
            .get(&claims.sid)
            .map(|s| s.user_id == claims.sub && !s.is_expired_at(now));
        match live {
            Some(true) => Ok(AuthUser {
                user_id: claims.sub,
                session_id: claims.sid,
            }),
            Some(false) => {
                self.prune_expired(now);
                Err(AuthError::SessionExpired.into())
            }
            None => Err(AuthError::SessionExpired.into()),
        }
    }

    fn current_user(&self, auth: &AuthUser) -> Result<User> {
        self.users.get_by_id(&auth.user_id)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

/// Decodes `FB_SECRET_KEY`: base64 of 32 bytes, or a 32-character ASCII string.
pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => anyhow::bail!("JWT secret must be base64 encoded or a 32-byte ASCII string"),
    };
    if decoded.len() != 32 {
        anyhow::bail!("JWT secret must decode to exactly 32 bytes");
    }
    Ok(decoded)
}

/// A fresh random secret. Tokens do not survive a restart with it.
pub fn generate_secret_key() -> Vec<u8> {
    let mut bytes = vec![0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the bearer token and stores the [`AuthUser`] as a request extension.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(AuthError::InvalidToken)?;
    let auth_user = state.auth_service.authenticate(token)?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finboard_core::users::UserCredentials;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryUsers {
        rows: Mutex<Vec<UserCredentials>>,
    }

    #[async_trait]
    impl UserRepositoryTrait for MemoryUsers {
        fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
            Ok(self.rows.lock().unwrap().iter().find(|c| c.user.email == email).cloned())
        }

        fn get_by_id(&self, user_id: &str) -> Result<User> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.user.id == user_id)
                .map(|c| c.user.clone())
                .ok_or_else(|| DatabaseError::NotFound(user_id.to_string()).into())
        }

        async fn create(&self, record: NewUserRecord) -> Result<User> {
            let user = User {
                id: Uuid::new_v4().to_string(),
                email: record.email,
                display_name: record.display_name,
                created_at: Utc::now().naive_utc(),
            };
            self.rows.lock().unwrap().push(UserCredentials {
                user: user.clone(),
                password_hash: record.password_hash,
            });
            Ok(user)
        }
    }

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryUsers::default()),
            &generate_secret_key(),
            Duration::from_secs(3600),
        )
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: "correct horse".to_string(),
            display_name: Some("Jane".to_string()),
        }
    }

    #[tokio::test]
    async fn register_sign_in_and_sign_out() {
        let auth = service();
        let mut events = auth.subscribe();

        let registered = auth.register(new_user("Jane@Example.com")).await.unwrap();
        assert_eq!(registered.user.email, "jane@example.com");
        let who = auth.authenticate(&registered.access_token).unwrap();
        assert_eq!(who.user_id, registered.user.id);
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn { .. }));

        let session = auth
            .sign_in(SignInRequest {
                email: "jane@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        let second = auth.authenticate(&session.access_token).unwrap();
        assert_ne!(second.session_id, who.session_id);
        assert_eq!(auth.active_sessions(), 2);

        auth.sign_out(&second).await.unwrap();
        assert!(matches!(
            auth.authenticate(&session.access_token),
            Err(Error::Auth(AuthError::SessionExpired))
        ));
        // The first session is unaffected
        assert!(auth.authenticate(&registered.access_token).is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_and_bad_password() {
        let auth = service();
        auth.register(new_user("jane@example.com")).await.unwrap();

        assert!(matches!(
            auth.register(new_user("JANE@example.com")).await,
            Err(Error::Auth(AuthError::EmailTaken))
        ));
        assert!(matches!(
            auth.sign_in(SignInRequest {
                email: "jane@example.com".to_string(),
                password: "wrong password".to_string(),
            })
            .await,
            Err(Error::Auth(AuthError::InvalidCredentials))
        ));
        assert!(matches!(
            auth.sign_in(SignInRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever1".to_string(),
            })
            .await,
            Err(Error::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped_on_sign_in() {
        let auth = service();
        let registered = auth.register(new_user("jane@example.com")).await.unwrap();
        let stale_at = Utc::now() - chrono::Duration::seconds(5);
        {
            let mut sessions = auth.sessions_write();
            for i in 0..20 {
                let id = format!("stale-{i}");
                sessions.insert(
                    id.clone(),
                    Session {
                        id,
                        user_id: registered.user.id.clone(),
                        expires_at: stale_at,
                    },
                );
            }
        }
        assert_eq!(auth.active_sessions(), 21);

        let session = auth
            .sign_in(SignInRequest {
                email: "jane@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(auth.active_sessions(), 2);
        assert!(auth.authenticate(&session.access_token).is_ok());
        assert!(auth.authenticate(&registered.access_token).is_ok());
    }

    #[test]
    fn garbage_token_rejected() {
        let auth = service();
        assert!(matches!(
            auth.authenticate("not-a-jwt"),
            Err(Error::Auth(AuthError::InvalidToken))
        ));
    }

    #[test]
    fn secret_key_decoding() {
        assert!(decode_secret_key("").is_err());
        assert_eq!(
            decode_secret_key("0123456789abcdef0123456789abcde!").unwrap().len(),
            32
        );
        assert_eq!(decode_secret_key(&BASE64.encode([7u8; 32])).unwrap(), vec![7u8; 32]);
        assert!(decode_secret_key(&BASE64.encode([7u8; 16])).is_err());
    }
}
