//! API errors mapped to HTTP status codes with a `{"error": "..."}` body.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use faq_core::FaqError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body or ingest input (400).
    BadRequest(String),
    /// Missing or wrong admin token (401).
    Unauthorized(String),
    /// Unknown topic (404).
    NotFound(String),
    /// Storage, lemmatizer or runtime failure (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => {
                tracing::error!(error = %m, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<FaqError> for ApiError {
    fn from(err: FaqError) -> Self {
        match err {
            FaqError::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            FaqError::NotFound(_) => ApiError::NotFound(err.to_string()),
            FaqError::Lemmatizer(_) | FaqError::Config(_) | FaqError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
