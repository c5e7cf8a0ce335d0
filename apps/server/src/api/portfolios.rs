use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};

use finboard_core::portfolio::{
    allocation::AllocationSlice,
    valuation::{DashboardSummary, PortfolioMetrics},
    NewPortfolio, NewPosition, Portfolio, PortfolioUpdate, Position, PositionUpdate,
};
use finboard_core::users::AuthUser;

use crate::{error::ApiResult, main_lib::AppState};

async fn list_portfolios(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Portfolio>>> {
    let portfolios = state.portfolio_service.list_portfolios(&auth.user_id)?;
    Ok(Json(portfolios))
}

async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new_portfolio): Json<NewPortfolio>,
) -> ApiResult<(StatusCode, Json<Portfolio>)> {
    let portfolio = state
        .portfolio_service
        .create_portfolio(&auth.user_id, new_portfolio)
        .await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

async fn get_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Portfolio>> {
    Ok(Json(state.portfolio_service.get_portfolio(&auth.user_id, &id)?))
}

async fn update_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(update): Json<PortfolioUpdate>,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state
        .portfolio_service
        .update_portfolio(&auth.user_id, &id, update)
        .await?;
    Ok(Json(portfolio))
}

async fn delete_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    state
        .portfolio_service
        .delete_portfolio(&auth.user_id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_metrics(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<PortfolioMetrics>> {
    let metrics = state
        .portfolio_service
        .get_portfolio_metrics(&auth.user_id, &id)
        .await?;
    Ok(Json(metrics))
}

async fn get_allocation(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<AllocationSlice>>> {
    let slices = state
        .portfolio_service
        .get_portfolio_allocation(&auth.user_id, &id)
        .await?;
    Ok(Json(slices))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<DashboardSummary>> {
    let summary = state
        .portfolio_service
        .get_dashboard_summary(&auth.user_id)
        .await?;
    Ok(Json(summary))
}

async fn add_position(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new_position): Json<NewPosition>,
) -> ApiResult<(StatusCode, Json<Position>)> {
    let position = state
        .portfolio_service
        .add_position(&auth.user_id, &id, new_position)
        .await?;
    Ok((StatusCode::CREATED, Json(position)))
}

async fn update_position(
    Path((id, position_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(update): Json<PositionUpdate>,
) -> ApiResult<Json<Position>> {
    let position = state
        .portfolio_service
        .update_position(&auth.user_id, &id, &position_id, update)
        .await?;
    Ok(Json(position))
}

async fn remove_position(
    Path((id, position_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    state
        .portfolio_service
        .remove_position(&auth.user_id, &id, &position_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios", get(list_portfolios).post(create_portfolio))
        .route("/portfolios/summary", get(get_summary))
        .route(
            "/portfolios/{id}",
            get(get_portfolio)
                .put(update_portfolio)
                .delete(delete_portfolio),
        )
        .route("/portfolios/{id}/metrics", get(get_metrics))
        .route("/portfolios/{id}/allocation", get(get_allocation))
        .route("/portfolios/{id}/positions", post(add_position))
        .route(
            "/portfolios/{id}/positions/{position_id}",
            put(update_position).delete(remove_position),
        )
}
