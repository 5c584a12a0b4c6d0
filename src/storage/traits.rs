//! Object store contract consumed by the cache backends.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::error;

use super::StorageError;

/// Largest batch handed to [`ObjectStore::delete_batch`] unless a store says
/// otherwise. Matches the S3 DeleteObjects limit.
pub const DEFAULT_DELETE_BATCH: usize = 1000;

/// Minimal key/value byte store with prefix enumeration.
///
/// Keys passed here are physical keys: the cache has already applied its
/// prefix. Implementations add no retries or timeouts of their own beyond
/// what the underlying client does.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` at `key`, replacing whatever was there.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError>;

    /// Read the object at `key`. Returns `Ok(None)` if it does not exist.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError>;

    /// Delete the object at `key`. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List every key starting with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Delete at most [`max_delete_batch`](Self::max_delete_batch) objects in
    /// one request, reporting success per key.
    ///
    /// An `Err` means the request as a whole failed.
    async fn delete_batch(&self, keys: &[String]) -> Result<HashMap<String, bool>, StorageError>;

    /// Number of keys a single [`delete_batch`](Self::delete_batch) accepts.
    fn max_delete_batch(&self) -> usize {
        DEFAULT_DELETE_BATCH
    }

    /// Delete any number of objects, one batch at a time.
    ///
    /// A failed batch marks its own keys `false`; the remaining batches are
    /// still sent.
    async fn delete_many(&self, keys: &[String]) -> HashMap<String, bool> {
        let mut results = HashMap::with_capacity(keys.len());

        for batch in keys.chunks(self.max_delete_batch().max(1)) {
            match self.delete_batch(batch).await {
                Ok(outcome) => {
                    for key in batch {
                        let deleted = outcome.get(key).copied().unwrap_or(false);
                        results.insert(key.clone(), deleted);
                    }
                }
                Err(e) => {
                    error!(
                        "Could not delete batch of {} keys starting at {:?}: {}",
                        batch.len(),
                        batch[0],
                        e
                    );
                    results.extend(batch.iter().map(|key| (key.clone(), false)));
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryObjectStore;

    /// Splits deletes into pairs and refuses any pair holding `poisoned`.
    struct PairwiseStore {
        inner: InMemoryObjectStore,
        poisoned: &'static str,
    }

    #[async_trait]
    impl ObjectStore for PairwiseStore {
        async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
            self.inner.put(key, data).await
        }

        async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }

        async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
            self.inner.list(prefix).await
        }

        async fn delete_batch(
            &self,
            keys: &[String],
        ) -> Result<HashMap<String, bool>, StorageError> {
            if keys.iter().any(|k| k == self.poisoned) {
                return Err(StorageError::network(self.poisoned, "connection reset by peer"));
            }
            self.inner.delete_batch(keys).await
        }

        fn max_delete_batch(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_later_batches() {
        let store = PairwiseStore {
            inner: InMemoryObjectStore::new(),
            poisoned: "b",
        };
        let keys: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|k| k.to_string()).collect();
        for key in &keys {
            store.put(key, Bytes::from_static(b"x")).await.unwrap();
        }

        let results = store.delete_many(&keys).await;

        assert_eq!(results.len(), 5);
        assert_eq!(results.get("a"), Some(&false));
        assert_eq!(results.get("b"), Some(&false));
        assert_eq!(results.get("c"), Some(&true));
        assert_eq!(results.get("d"), Some(&true));
        assert_eq!(results.get("e"), Some(&true));

        assert!(store.inner.contains_key("a").await);
        assert!(store.inner.contains_key("b").await);
        assert!(!store.inner.contains_key("c").await);
        assert!(!store.inner.contains_key("e").await);
    }

    #[tokio::test]
    async fn test_delete_many_of_nothing_is_empty() {
        let store = InMemoryObjectStore::new();
        assert!(store.delete_many(&[]).await.is_empty());
    }
}
