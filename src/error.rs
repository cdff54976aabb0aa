//! Error types for the guest logger

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure of the realtime fallback channel. Each variant ends the current
/// fetch attempt.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Channel connection failed: {0}")]
    ConnectFailed(String),

    #[error("No channel message within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Malformed channel message: {0}")]
    MalformedMessage(String),
}

/// Persistence-layer failure
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("History limit must be positive, got {0}")]
    InvalidLimit(i64),

    #[error("Day range must be between 1 and the calendar range, got {0}")]
    InvalidRange(u32),
}

/// Terminal outcome of a fetch-and-store run
#[derive(Error, Debug)]
pub enum FetchError {
    /// DNS, connect, timeout or non-2xx; extraction never ran
    #[error("Failed to fetch guest count page: {0}")]
    Network(#[from] reqwest::Error),

    /// Neither the markup nor the fallback channel yielded a count.
    /// The raw capture has been written.
    #[error("Could not find guest count in page; fallback failed: {fallback}")]
    Unparseable { fallback: ChannelError },

    #[error("Failed to store sample: {0}")]
    Store(#[from] StoreError),
}

/// Application error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    BadValue = 18,
    FetchFailure = 30,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Store(StoreError::InvalidLimit(_) | StoreError::InvalidRange(_)) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, self.to_string())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Fetch(FetchError::Store(e)) => {
                tracing::error!("Store error after fetch: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Fetch(e) => (StatusCode::BAD_GATEWAY, ErrorCode::FetchFailure, e.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
