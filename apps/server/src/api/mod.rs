use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderValue,
    middleware,
    response::{sse::Event as SseEvent, Sse},
    routing::get,
    Extension, Router,
};
use futures_core::stream::Stream;
use std::convert::Infallible;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use finboard_core::users::AuthUser;

use crate::{auth::require_auth, config::Config, events::user_event_stream, main_lib::AppState};

mod auth;
mod comparison;
mod market_data;
mod portfolios;
mod watchlists;

pub async fn healthz() -> &'static str {
    "ok"
}

/// Ready once the database answers a read.
pub async fn readyz(State(state): State<Arc<AppState>>) -> axum::http::StatusCode {
    match state.portfolio_service.list_portfolios("") {
        Ok(_) => axum::http::StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Change notifications for the calling user's data.
async fn stream_events(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    user_event_stream(state.event_sink.subscribe(), auth.user_id)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins = config
        .cors_allow
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let protected = Router::new()
        .merge(auth::protected_router())
        .merge(portfolios::router())
        .merge(watchlists::router())
        .merge(comparison::router())
        .merge(market_data::router())
        .route("/events/stream", get(stream_events))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(auth::public_router())
        .merge(protected);

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
