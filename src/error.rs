//! Application error type
//!
//! `AppError` is what handlers and services return; the `IntoResponse` impl
//! maps each class onto an HTTP status. Engine errors (`PoolError`) convert
//! into it according to their taxonomy: validation and state errors are the
//! caller's to fix (400), consistency errors indicate a mis-seeded bracket
//! and surface as 500 with the message intact.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

use crate::bracket::PoolError;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    BadRequest(String),
    NotFound(String),
    Database(sqlx::Error),
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Database(err) => write!(f, "Database error: {}", err),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::CountMismatch { .. }
            | PoolError::InvalidRoster { .. }
            | PoolError::InvalidScore { .. }
            | PoolError::InvalidPayouts { .. }
            | PoolError::InvalidPushRule { .. }
            | PoolError::MissingSpread { .. }
            | PoolError::MissingScores { .. } => AppError::Validation(err.to_string()),

            PoolError::AlreadyDrawn
            | PoolError::DrawNotCompleted
            | PoolError::AlreadyEliminated { .. }
            | PoolError::SpreadLocked { .. }
            | PoolError::TiedGame { .. }
            | PoolError::SlotsUnfilled { .. } => AppError::BadRequest(err.to_string()),

            PoolError::NoDestination { .. }
            | PoolError::OwnerNotFound { .. }
            | PoolError::SlotConflict { .. } => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
