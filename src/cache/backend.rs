//! Bucket Cache Module
//!
//! Cache backend that keeps every entry as an envelope object in a bucket.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::envelope;
use crate::cache::{current_timestamp_ms, CacheBackend, Expiry, KeyCodec, Timeout};
use crate::config::{CacheOptions, Config};
use crate::error::{CacheError, Result};
use crate::storage::ObjectStore;

// == Bucket Cache ==
/// Cache backed by an object storage bucket.
///
/// Holds nothing mutable: each call is a self-contained round trip to the
/// store, so one instance can be shared freely across tasks. Expiry lives in
/// the stored envelope; consider a bucket lifecycle rule to reclaim expired
/// objects nobody reads again.
#[derive(Clone)]
pub struct BucketCache {
    /// Bucket name, for log messages
    bucket: String,
    /// Prefix handling
    keys: KeyCodec,
    /// Default timeout in seconds, `0` or below means never expire
    default_timeout: i64,
    /// Backend options
    options: CacheOptions,
    /// Object store client
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for BucketCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketCache")
            .field("bucket", &self.bucket)
            .field("keys", &self.keys)
            .field("default_timeout", &self.default_timeout)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl BucketCache {
    // == Constructor ==
    /// Creates a cache over `store` using `config`.
    ///
    /// Fails if the config names no bucket.
    pub fn new(config: &Config, store: Arc<dyn ObjectStore>) -> Result<Self> {
        config.require_bucket()?;

        Ok(Self {
            bucket: config.bucket.clone(),
            keys: KeyCodec::new(config.key_prefix.clone()),
            default_timeout: config.default_timeout,
            options: config.options,
            store,
        })
    }

    /// Returns the key codec (and so the prefix) of this cache.
    pub fn keys(&self) -> &KeyCodec {
        &self.keys
    }

    // == Typed Helpers ==
    /// Serializes `value` and stores it at `key`.
    pub async fn set_as<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        timeout: Timeout,
    ) -> Result<bool> {
        let value =
            serde_json::to_value(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set(key, value, timeout).await
    }

    /// Reads `key` as a `T`. A stored value of another shape is a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(typed) => Ok(Some(typed)),
            Err(e) => {
                debug!("get key {:?} -> value has unexpected shape ({})", key, e);
                Ok(None)
            }
        }
    }

    // == Lookup ==
    /// Shared read path of `get` and `has`.
    async fn lookup(&self, op: &str, key: &str) -> Result<Option<Value>> {
        let physical = self.keys.to_physical(key);

        let Some(data) = self.store.get(&physical).await? else {
            debug!("{} key {:?} -> miss", op, physical);
            return Ok(None);
        };

        let entry = match envelope::decode(&data) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{} key {:?} -> not a cache envelope ({})", op, physical, e);
                self.purge(op, &physical).await;
                return Ok(None);
            }
        };

        if entry.expires_at.is_expired_at(current_timestamp_ms()) {
            debug!("{} key {:?} -> expired", op, physical);
            self.purge(op, &physical).await;
            return Ok(None);
        }

        debug!("{} key {:?} -> hit", op, physical);
        Ok(Some(entry.value))
    }

    /// Deletes a stale object when purge-on-read is enabled.
    ///
    /// Best effort: a failed delete leaves the read a plain miss.
    async fn purge(&self, op: &str, physical: &str) {
        if !self.options.purge_expired_on_read {
            return;
        }

        match self.store.delete(physical).await {
            Ok(()) => debug!("{} key {:?} -> purged", op, physical),
            Err(e) => warn!("{} key {:?} -> purge failed: {}", op, physical, e),
        }
    }
}

#[async_trait]
impl CacheBackend for BucketCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.lookup("get", key).await
    }

    async fn set(&self, key: &str, value: Value, timeout: Timeout) -> Result<bool> {
        let physical = self.keys.to_physical(key);
        let timeout_secs = timeout.resolve(self.default_timeout);
        let expires_at = Expiry::after_seconds(timeout_secs, current_timestamp_ms());

        let data = envelope::encode(&value, expires_at)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.store.put(&physical, data).await?;

        debug!("set key {:?} -> expires {:?}", physical, expires_at);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let physical = self.keys.to_physical(key);
        self.store.delete(&physical).await?;

        debug!("delete key {:?}", physical);
        Ok(true)
    }

    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.lookup("has", key).await?.is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<HashMap<String, bool>> {
        if keys.is_empty() {
            debug!("delete many -> no keys provided, no-op");
            return Ok(HashMap::new());
        }

        let physical: Vec<String> = keys.iter().map(|k| self.keys.to_physical(k)).collect();
        let deleted = self.store.delete_many(&physical).await;

        let results = keys
            .iter()
            .zip(&physical)
            .map(|(key, phys)| (key.clone(), deleted.get(phys).copied().unwrap_or(false)))
            .collect();
        Ok(results)
    }

    async fn clear(&self) -> Result<usize> {
        let prefix = self.keys.prefix();
        if prefix.is_empty() {
            warn!(
                "Clearing cache with an empty key prefix removes every object in bucket {}",
                self.bucket
            );
        }

        let listed = self.store.list(prefix).await?;
        let total = listed.len();
        let owned: Vec<String> = listed
            .into_iter()
            .filter(|k| self.keys.strip_prefix(k).is_some())
            .collect();

        if owned.len() < total {
            warn!(
                "Listing {} with prefix {:?} returned {} foreign keys, skipping them",
                self.bucket,
                prefix,
                total - owned.len()
            );
        }

        if owned.is_empty() {
            return Ok(0);
        }

        let results = self.store.delete_many(&owned).await;
        let removed = results.values().filter(|ok| **ok).count();
        if removed < owned.len() {
            error!(
                "Could not clear {} of {} keys in {} with prefix {:?}",
                owned.len() - removed,
                owned.len(),
                self.bucket,
                prefix
            );
        }

        Ok(removed)
    }
}
