//! Error types for the fetch cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Fetch Error Enum ==
/// Unified error type for the fetch cache service.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key found but past its ttl
    #[error("Key expired: {0}")]
    Expired(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The wrapped producer failed; the original cause is passed through
    #[error("Producer failed for key '{key}': {source}")]
    ProducerFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The producer did not complete within the configured bound
    #[error("Producer timed out for key '{key}' after {timeout_ms}ms")]
    ProducerTimeout { key: String, timeout_ms: u64 },

    /// The underlying key-value store could not be read or written
    #[error("Storage failure: {0}")]
    Storage(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let status = match &self {
            FetchError::NotFound(_) => StatusCode::NOT_FOUND,
            FetchError::Expired(_) => StatusCode::NOT_FOUND,
            FetchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FetchError::ProducerFailed { .. } => StatusCode::BAD_GATEWAY,
            FetchError::ProducerTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            FetchError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the fetch cache.
pub type Result<T> = std::result::Result<T, FetchError>;
