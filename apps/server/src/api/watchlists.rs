use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

use finboard_core::users::AuthUser;
use finboard_core::watchlists::{NewWatchlist, Watchlist, WatchlistQuotes, WatchlistUpdate};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct SymbolBody {
    symbol: String,
}

async fn list_watchlists(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Watchlist>>> {
    Ok(Json(state.watchlist_service.list_watchlists(&auth.user_id)?))
}

async fn create_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new_watchlist): Json<NewWatchlist>,
) -> ApiResult<(StatusCode, Json<Watchlist>)> {
    let watchlist = state
        .watchlist_service
        .create_watchlist(&auth.user_id, new_watchlist)
        .await?;
    Ok((StatusCode::CREATED, Json(watchlist)))
}

async fn get_watchlist(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Watchlist>> {
    Ok(Json(state.watchlist_service.get_watchlist(&auth.user_id, &id)?))
}

async fn rename_watchlist(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(update): Json<WatchlistUpdate>,
) -> ApiResult<Json<Watchlist>> {
    let watchlist = state
        .watchlist_service
        .rename_watchlist(&auth.user_id, &id, update)
        .await?;
    Ok(Json(watchlist))
}

async fn delete_watchlist(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    state
        .watchlist_service
        .delete_watchlist(&auth.user_id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_symbol(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SymbolBody>,
) -> ApiResult<Json<Watchlist>> {
    let watchlist = state
        .watchlist_service
        .add_symbol(&auth.user_id, &id, &body.symbol)
        .await?;
    Ok(Json(watchlist))
}

async fn remove_symbol(
    Path((id, symbol)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Watchlist>> {
    let watchlist = state
        .watchlist_service
        .remove_symbol(&auth.user_id, &id, &symbol)
        .await?;
    Ok(Json(watchlist))
}

async fn get_quotes(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<WatchlistQuotes>> {
    let quotes = state
        .watchlist_service
        .get_watchlist_quotes(&auth.user_id, &id)
        .await?;
    Ok(Json(quotes))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/watchlists", get(list_watchlists).post(create_watchlist))
        .route(
            "/watchlists/{id}",
            get(get_watchlist)
                .put(rename_watchlist)
                .delete(delete_watchlist),
        )
        .route("/watchlists/{id}/symbols", post(add_symbol))
        .route("/watchlists/{id}/symbols/{symbol}", delete(remove_symbol))
        .route("/watchlists/{id}/quotes", get(get_quotes))
}
