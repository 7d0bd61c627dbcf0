//! Request-level error type shared by all handlers.
//!
//! Maps business-level failures onto HTTP status codes and structured JSON
//! bodies: validation errors carry field-level messages the way the API's
//! clients expect them.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or out-of-range input, keyed by field name
    Validation { field: &'static str, message: String },
    /// Missing or invalid credentials
    Unauthorized(String),
    /// Authenticated but not permitted to act on the resource
    Forbidden(String),
    /// Resource id absent, or absent after ownership filtering
    NotFound(String),
    /// Database/persistence error
    Database(String),
}

impl ApiError {
    pub fn not_owner() -> Self {
        ApiError::Forbidden("You are not the owner of this book.".to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation { field, message } => {
                write!(f, "Validation error on '{}': {}", field, message)
            }
            ApiError::Unauthorized(msg) => write!(f, "Authentication error: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Permission denied: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<sea_orm::DbErr> for ApiError {
    fn from(e: sea_orm::DbErr) -> Self {
        ApiError::Database(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ field: [message] })),
            )
                .into_response(),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, Json(json!({ "detail": msg }))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
