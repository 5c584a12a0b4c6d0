//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Misses (absent, expired or corrupt entries) are not errors; they come back
/// as `None`/`false` from the backend.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration names a backend the registry doesn't know
    #[error("Unknown cache backend: {0}")]
    UnknownBackend(String),

    /// The object store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A value could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// incr/decr on a value that isn't an integer
    #[error("Value at {0} is not an integer")]
    NotAnInteger(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in cache (HTTP surface only)
    #[error("Key not found: {0}")]
    NotFound(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::NotAnInteger(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::Storage(_) => StatusCode::BAD_GATEWAY,
            CacheError::Config(_) | CacheError::UnknownBackend(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
