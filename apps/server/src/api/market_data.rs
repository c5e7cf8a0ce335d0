use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use finboard_core::events::{DomainEvent, DomainEventSink};
use finboard_core::symbols::{normalize_symbol, normalize_symbols};
use finboard_market_data::{
    ChartRange, CompanyProfile, HistoricalBar, KeyMetrics, MarketDataProvider, Quote, SearchResult,
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const DEFAULT_SEARCH_LIMIT: usize = 10;
const MAX_SEARCH_LIMIT: usize = 50;

#[derive(Deserialize)]
struct QuotesQuery {
    /// Comma separated.
    symbols: String,
}

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    range: ChartRange,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    limit: Option<usize>,
}

#[derive(Deserialize, Default)]
struct RefreshBody {
    symbols: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    /// Empty when everything was dropped.
    symbols: Vec<String>,
}

async fn get_quotes(
    Query(query): Query<QuotesQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Quote>>> {
    let raw: Vec<String> = query
        .symbols
        .split(',')
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty())
        .collect();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("No symbols given".to_string()));
    }
    let symbols = normalize_symbols(&raw)?;
    Ok(Json(state.market_data.get_quotes(&symbols).await?))
}

async fn get_quote(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Quote>> {
    let symbol = normalize_symbol(&symbol)?;
    Ok(Json(state.market_data.get_quote(&symbol).await?))
}

async fn get_history(
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<HistoricalBar>>> {
    let symbol = normalize_symbol(&symbol)?;
    Ok(Json(state.market_data.get_history(&symbol, query.range).await?))
}

async fn search(
    Query(query): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("Search query cannot be empty".to_string()));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);
    Ok(Json(state.market_data.search(q, limit).await?))
}

async fn get_profile(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CompanyProfile>> {
    let symbol = normalize_symbol(&symbol)?;
    Ok(Json(state.market_data.get_profile(&symbol).await?))
}

async fn get_key_metrics(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<KeyMetrics>> {
    let symbol = normalize_symbol(&symbol)?;
    Ok(Json(state.market_data.get_key_metrics(&symbol).await?))
}

/// Drops cached market data so the next reads go upstream.
async fn refresh(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<RefreshResponse>> {
    let body: RefreshBody = if body.is_empty() {
        RefreshBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid refresh body: {}", e)))?
    };
    let symbols = match body.symbols {
        Some(symbols) if !symbols.is_empty() => {
            let symbols = normalize_symbols(&symbols)?;
            for symbol in &symbols {
                state.market_data.invalidate(symbol);
            }
            symbols
        }
        _ => {
            state.market_data.invalidate_all();
            Vec::new()
        }
    };
    tracing::info!("Market data refresh requested for {:?}", symbols);
    state
        .event_sink
        .emit(DomainEvent::market_data_refreshed(symbols.clone()));
    Ok(Json(RefreshResponse { symbols }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market-data/quotes", get(get_quotes))
        .route("/market-data/quotes/{symbol}", get(get_quote))
        .route("/market-data/history/{symbol}", get(get_history))
        .route("/market-data/search", get(search))
        .route("/market-data/profile/{symbol}", get(get_profile))
        .route("/market-data/metrics/{symbol}", get(get_key_metrics))
        .route("/market-data/refresh", post(refresh))
}
