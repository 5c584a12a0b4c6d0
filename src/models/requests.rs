//! Request DTOs for the cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{Timeout, MAX_KEY_LENGTH};

/// Validates a single logical key.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

fn validate_keys<'a>(mut keys: impl Iterator<Item = &'a String>) -> Option<String> {
    keys.find_map(|key| validate_key(key))
}

/// Request body for SET and ADD (PUT /set, PUT /add)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `timeout`: Optional timeout in seconds (default if absent, never if <= 0)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional timeout in seconds
    #[serde(default)]
    pub timeout: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }

    /// Timeout to write with
    pub fn timeout(&self) -> Timeout {
        Timeout::from(self.timeout)
    }
}

/// Request body listing keys (POST /get_many, POST /delete_many)
#[derive(Debug, Clone, Deserialize)]
pub struct KeysRequest {
    pub keys: Vec<String>,
}

impl KeysRequest {
    /// Validates every key
    pub fn validate(&self) -> Option<String> {
        validate_keys(self.keys.iter())
    }
}

/// Request body for SET_MANY (PUT /set_many)
#[derive(Debug, Clone, Deserialize)]
pub struct SetManyRequest {
    /// Values keyed by cache key
    pub entries: HashMap<String, Value>,
    /// Optional timeout in seconds applied to every entry
    #[serde(default)]
    pub timeout: Option<i64>,
}

impl SetManyRequest {
    /// Validates every key
    pub fn validate(&self) -> Option<String> {
        validate_keys(self.entries.keys())
    }
}

/// Request body for INCR and DECR (POST /incr/:key, POST /decr/:key)
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaRequest {
    /// Amount to add or subtract
    #[serde(default = "default_delta")]
    pub delta: i64,
}

impl Default for DeltaRequest {
    fn default() -> Self {
        Self {
            delta: default_delta(),
        }
    }
}

fn default_delta() -> i64 {
    1
}
