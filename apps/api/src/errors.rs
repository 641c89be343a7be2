use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::recommender::RecommenderError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Nothing here is process-fatal: every failure degrades to a JSON error body
/// and the next request proceeds normally.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Persistence error: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error(transparent)]
    Recommender(#[from] RecommenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUsername => AppError::DuplicateUsername,
            StoreError::WeakCredential => {
                AppError::Validation("Username or password too short".to_string())
            }
            // A session naming a user the store no longer knows is a stale
            // credential, not a server fault.
            StoreError::UnknownUser(_) => AppError::Unauthorized,
            StoreError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid username or password".to_string(),
            ),
            AppError::DuplicateUsername => (
                StatusCode::CONFLICT,
                "DUPLICATE_USERNAME",
                "Username already exists".to_string(),
            ),
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "Failed to save account data".to_string(),
                )
            }
            AppError::Recommender(e) => {
                tracing::error!("Recommendation call failed: {e}");
                match e {
                    RecommenderError::Timeout => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "TIMEOUT",
                        "The recommendation service timed out".to_string(),
                    ),
                    RecommenderError::Network(_) => (
                        StatusCode::BAD_GATEWAY,
                        "NETWORK_ERROR",
                        "Could not reach the recommendation service".to_string(),
                    ),
                    RecommenderError::Upstream { status } => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        format!("Recommendation service returned status {status}"),
                    ),
                    RecommenderError::Malformed(_) => (
                        StatusCode::BAD_GATEWAY,
                        "MALFORMED_RESPONSE",
                        "The recommendation service returned an unreadable response".to_string(),
                    ),
                }
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
