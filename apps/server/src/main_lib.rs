use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use finboard_core::comparison::{ComparisonService, ComparisonServiceTrait};
use finboard_core::events::{BroadcastEventSink, DomainEventSink};
use finboard_core::portfolio::{PortfolioService, PortfolioServiceTrait};
use finboard_core::users::AuthServiceTrait;
use finboard_core::watchlists::{WatchlistService, WatchlistServiceTrait};
use finboard_market_data::{CacheConfig, CachedProvider, FmpProvider, MarketDataProvider};
use finboard_storage_sqlite::{
    comparison::ComparisonRepository,
    db::{self, spawn_writer},
    portfolios::PortfolioRepository,
    users::UserRepository,
    watchlists::WatchlistRepository,
};

use crate::auth::{decode_secret_key, generate_secret_key, AuthService};
use crate::config::Config;

const DOMAIN_EVENT_CAPACITY: usize = 1024;

pub type MarketData = CachedProvider<FmpProvider>;

pub struct AppState {
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub watchlist_service: Arc<dyn WatchlistServiceTrait>,
    pub comparison_service: Arc<dyn ComparisonServiceTrait>,
    pub auth_service: Arc<dyn AuthServiceTrait>,
    /// Cached provider; handlers use it directly for lookups and refresh.
    pub market_data: Arc<MarketData>,
    pub event_sink: Arc<BroadcastEventSink>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("FB_LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("text") {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    } else {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let jwt_secret = match &config.secret_key {
        Some(raw) => decode_secret_key(raw)?,
        None => {
            tracing::warn!("FB_SECRET_KEY not set; generated a key for this process only");
            generate_secret_key()
        }
    };

    if config.fmp_api_key.is_empty() {
        tracing::warn!("FB_FMP_API_KEY not set; market data requests will be rejected upstream");
    }
    let provider = FmpProvider::with_base_url(config.fmp_api_key.clone(), config.fmp_base_url.clone());
    let market_data = Arc::new(CachedProvider::new(
        provider,
        CacheConfig::with_quote_ttl(config.quote_cache_ttl),
    ));
    let provider_handle: Arc<dyn MarketDataProvider> = market_data.clone();

    let event_sink = Arc::new(BroadcastEventSink::new(DOMAIN_EVENT_CAPACITY));
    let sink_handle: Arc<dyn DomainEventSink> = event_sink.clone();

    let user_repository = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let portfolio_repository = Arc::new(PortfolioRepository::new(pool.clone(), writer.clone()));
    let watchlist_repository = Arc::new(WatchlistRepository::new(pool.clone(), writer.clone()));
    let comparison_repository = Arc::new(ComparisonRepository::new(pool.clone(), writer.clone()));

    let auth_service = Arc::new(AuthService::new(
        user_repository,
        &jwt_secret,
        config.access_token_ttl,
    ));
    let portfolio_service = Arc::new(PortfolioService::new(
        portfolio_repository,
        provider_handle.clone(),
        sink_handle.clone(),
    ));
    let watchlist_service = Arc::new(WatchlistService::new(
        watchlist_repository,
        provider_handle.clone(),
        sink_handle.clone(),
    ));
    let comparison_service = Arc::new(ComparisonService::new(
        comparison_repository,
        provider_handle,
        sink_handle,
    ));

    Ok(Arc::new(AppState {
        portfolio_service,
        watchlist_service,
        comparison_service,
        auth_service,
        market_data,
        event_sink,
        db_path,
    }))
}
