use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use finboard_core::errors::{AuthError, DatabaseError, Error as CoreError};
use finboard_market_data::MarketDataError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
}

impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        ApiError::Core(CoreError::MarketData(err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Core(CoreError::Auth(err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        CoreError::LimitExceeded(_) => StatusCode::CONFLICT,
        CoreError::Auth(AuthError::EmailTaken) => StatusCode::CONFLICT,
        CoreError::Auth(_) => StatusCode::UNAUTHORIZED,
        CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Database(DatabaseError::UniqueViolation(_))
        | CoreError::Database(DatabaseError::ForeignKeyViolation(_)) => StatusCode::CONFLICT,
        CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CoreError::MarketData(MarketDataError::SymbolNotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::MarketData(MarketDataError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
        CoreError::MarketData(_) => StatusCode::BAD_GATEWAY,
        CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(e) => core_status(e),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
