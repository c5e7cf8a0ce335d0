use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

use finboard_core::comparison::{ComparisonChart, ComparisonSelection};
use finboard_core::users::AuthUser;
use finboard_market_data::ChartRange;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct AddSymbolBody {
    symbol: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct ChartQuery {
    #[serde(default)]
    range: ChartRange,
}

async fn get_selection(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ComparisonSelection>> {
    Ok(Json(state.comparison_service.get_selection(&auth.user_id)?))
}

async fn add_symbol(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<AddSymbolBody>,
) -> ApiResult<Json<ComparisonSelection>> {
    let selection = state
        .comparison_service
        .add_symbol(&auth.user_id, &body.symbol, body.name)
        .await?;
    Ok(Json(selection))
}

async fn remove_symbol(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ComparisonSelection>> {
    let selection = state
        .comparison_service
        .remove_symbol(&auth.user_id, &symbol)
        .await?;
    Ok(Json(selection))
}

async fn clear_selection(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ComparisonSelection>> {
    Ok(Json(state.comparison_service.clear(&auth.user_id).await?))
}

async fn get_chart(
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ComparisonChart>> {
    let chart = state
        .comparison_service
        .compare(&auth.user_id, query.range)
        .await?;
    Ok(Json(chart))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/comparison", get(get_selection).delete(clear_selection))
        .route("/comparison/symbols", post(add_symbol))
        .route("/comparison/symbols/{symbol}", delete(remove_symbol))
        .route("/comparison/chart", get(get_chart))
}
