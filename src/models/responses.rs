//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for SET and ADD
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// The key that was written
    pub key: String,
    /// Whether the value was stored (false when ADD found a live entry)
    pub stored: bool,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, stored: bool) -> Self {
        Self {
            key: key.into(),
            stored,
        }
    }
}

/// Response body for the HAS operation (GET /has/:key)
#[derive(Debug, Clone, Serialize)]
pub struct HasResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub key: String,
    pub deleted: bool,
}

/// Response body for GET_MANY
///
/// Hits go in `values`, so a cached `null` stays distinguishable from a miss.
#[derive(Debug, Clone, Serialize)]
pub struct GetManyResponse {
    pub values: HashMap<String, Value>,
    pub missing: Vec<String>,
}

impl GetManyResponse {
    /// Splits per-key lookups into hits and misses, misses in request order.
    pub fn from_lookups(keys: &[String], mut found: HashMap<String, Option<Value>>) -> Self {
        let mut values = HashMap::with_capacity(found.len());
        let mut missing = Vec::new();

        for key in keys {
            match found.remove(key) {
                Some(Some(value)) => {
                    values.insert(key.clone(), value);
                }
                Some(None) => missing.push(key.clone()),
                // Duplicate key, already placed
                None => {}
            }
        }

        Self { values, missing }
    }
}

/// Per-key outcome of SET_MANY and DELETE_MANY
#[derive(Debug, Clone, Serialize)]
pub struct BulkResponse {
    pub results: HashMap<String, bool>,
}

/// Response body for CLEAR
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of objects removed
    pub removed: usize,
}

/// Response body for INCR and DECR
#[derive(Debug, Clone, Serialize)]
pub struct CounterResponse {
    pub key: String,
    pub value: i64,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
