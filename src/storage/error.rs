//! Error types for object storage operations.

use thiserror::Error;

/// Errors raised by an [`ObjectStore`](super::ObjectStore) implementation.
///
/// A missing object is never an error; `get` reports it as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store could not be reached or the request failed in transit.
    #[error("Network error for {key}: {message}")]
    Network { key: String, message: String },

    /// The credentials in use are not allowed to touch the object.
    #[error("Access denied to {bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    /// The configured bucket does not exist.
    #[error("No such bucket: {bucket}")]
    NoSuchBucket { bucket: String },

    /// Any other failure reported by the store.
    #[error("{message}")]
    Other { message: String },
}

impl StorageError {
    /// Shorthand for a transport failure on `key`.
    pub fn network(key: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::Network {
            key: key.into(),
            message: message.into(),
        }
    }
}
