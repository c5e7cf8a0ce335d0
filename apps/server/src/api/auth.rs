use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{sse::Event as SseEvent, Sse},
    routing::{get, post},
    Extension, Json, Router,
};
use futures_core::stream::Stream;

use finboard_core::users::{AuthSession, AuthUser, NewUser, SignInRequest, User};

use crate::{error::ApiResult, events::user_event_stream, main_lib::AppState};

async fn register(
    State(state): State<Arc<AppState>>,
    Json(new_user): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = state.auth_service.register(new_user).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state.auth_service.sign_in(request).await?;
    Ok(Json(session))
}

async fn sign_out(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    state.auth_service.sign_out(&auth).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.auth_service.current_user(&auth)?))
}

/// Sign-in and sign-out notifications for the calling user.
async fn auth_events(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    user_event_stream(state.auth_service.subscribe(), auth.user_id)
}

pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/sign-in", post(sign_in))
}

pub fn protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/me", get(me))
        .route("/auth/events", get(auth_events))
}
