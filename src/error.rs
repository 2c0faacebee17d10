use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::providers::ProviderError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No more results available for this search")]
    NoMoreResults,

    #[error("Search failed: {0}")]
    SearchFailed(#[source] ProviderError),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Another fetch is already in flight for this search session")]
    ConcurrentAccess,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session capacity of {0} reached")]
    CapacityExceeded(usize),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoMoreResults => StatusCode::GONE,
            AppError::InvalidState(_) | AppError::ConcurrentAccess => StatusCode::CONFLICT,
            AppError::SearchFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::CapacityExceeded(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
