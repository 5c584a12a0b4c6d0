//! Null Cache Module
//!
//! A backend that stores nothing. Selecting it in configuration turns
//! caching off without touching calling code.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheBackend, Timeout};
use crate::error::Result;

/// Backend where every write is accepted and dropped, and every read misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

#[async_trait]
impl CacheBackend for NullCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        debug!("get key {:?} -> miss (null cache)", key);
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value, _timeout: Timeout) -> Result<bool> {
        Ok(true)
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(true)
    }

    async fn has(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear(&self) -> Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullCache;

        assert!(cache.set("k", json!("v"), Timeout::Default).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.has("k").await.unwrap());
        assert!(cache.delete("k").await.unwrap());
        assert_eq!(cache.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_null_cache_incr_starts_from_zero_each_time() {
        let cache = NullCache;
        assert_eq!(cache.incr("n", 3).await.unwrap(), 3);
        assert_eq!(cache.incr("n", 3).await.unwrap(), 3);
    }
}
