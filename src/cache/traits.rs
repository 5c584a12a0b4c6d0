//! Cache contract exposed to the host application.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::error;

use crate::cache::Timeout;
use crate::error::{CacheError, Result};

/// The operations every cache backend offers.
///
/// Misses come back as `None`/`false`; an `Err` always means the underlying
/// store failed (or, for `incr`/`decr`, that the stored value isn't an
/// integer). Bulk operations isolate failures per key.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the live value at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` at `key`, replacing any existing entry.
    async fn set(&self, key: &str, value: Value, timeout: Timeout) -> Result<bool>;

    /// Deletes `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Returns true if `key` holds a live entry.
    async fn has(&self, key: &str) -> Result<bool>;

    /// Deletes every entry this cache owns, returning how many were removed.
    async fn clear(&self) -> Result<usize>;

    /// Stores `value` only if `key` holds no live entry.
    ///
    /// The existence check and the write are separate requests, so two
    /// concurrent adds can both succeed.
    async fn add(&self, key: &str, value: Value, timeout: Timeout) -> Result<bool> {
        if self.has(key).await? {
            return Ok(false);
        }
        self.set(key, value, timeout).await
    }

    /// Looks up several keys; a key whose read fails is reported as a miss.
    async fn get_many(&self, keys: &[String]) -> Vec<Option<Value>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let value = match self.get(key).await {
                Ok(value) => value,
                Err(e) => {
                    error!("get_many key {:?} -> {}", key, e);
                    None
                }
            };
            values.push(value);
        }
        values
    }

    /// Like [`get_many`](Self::get_many), keyed by the requested key.
    async fn get_dict(&self, keys: &[String]) -> HashMap<String, Option<Value>> {
        let values = self.get_many(keys).await;
        keys.iter().cloned().zip(values).collect()
    }

    /// Stores several entries, reporting success per key.
    async fn set_many(&self, entries: Vec<(String, Value)>, timeout: Timeout) -> HashMap<String, bool> {
        let mut results = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            let stored = match self.set(&key, value, timeout).await {
                Ok(stored) => stored,
                Err(e) => {
                    error!("set_many key {:?} -> {}", key, e);
                    false
                }
            };
            results.insert(key, stored);
        }
        results
    }

    /// Deletes several keys, reporting success per key.
    async fn delete_many(&self, keys: &[String]) -> Result<HashMap<String, bool>> {
        let mut results = HashMap::with_capacity(keys.len());
        for key in keys {
            let deleted = match self.delete(key).await {
                Ok(deleted) => deleted,
                Err(e) => {
                    error!("delete_many key {:?} -> {}", key, e);
                    false
                }
            };
            results.insert(key.clone(), deleted);
        }
        Ok(results)
    }

    /// Adds `delta` to the integer at `key` (a miss counts as 0) and writes it
    /// back with the default timeout.
    ///
    /// Read-modify-write: concurrent increments of the same key can lose updates.
    async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let current = match self.get(key).await? {
            None => 0,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| CacheError::NotAnInteger(key.to_string()))?,
        };

        let updated = current.checked_add(delta).ok_or_else(|| {
            CacheError::InvalidRequest(format!("incrementing {key} by {delta} overflows"))
        })?;

        self.set(key, Value::from(updated), Timeout::Default).await?;
        Ok(updated)
    }

    /// Subtracts `delta` from the integer at `key`. Same caveats as `incr`.
    async fn decr(&self, key: &str, delta: i64) -> Result<i64> {
        let negated = delta
            .checked_neg()
            .ok_or_else(|| CacheError::InvalidRequest(format!("cannot decrement by {delta}")))?;
        self.incr(key, negated).await
    }
}
