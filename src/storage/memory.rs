//! In-memory object store.
//!
//! Behaves like a bucket with no latency: used by the test suite and for
//! running the service locally without S3.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{ObjectStore, StorageError};

// == In-Memory Object Store ==
/// Object store backed by an ordered map, so prefix listing is a range scan.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl InMemoryObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Returns true if the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Returns true if an object exists at `key`.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let objects = self.objects.read().await;
        let keys = objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        Ok(keys)
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<HashMap<String, bool>, StorageError> {
        let mut objects = self.objects.write().await;
        let results = keys
            .iter()
            .map(|key| {
                objects.remove(key);
                (key.clone(), true)
            })
            .collect();
        Ok(results)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryObjectStore::new();
        store.put("a", Bytes::from_static(b"1")).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(Bytes::from_static(b"1")));
        assert_eq!(store.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = InMemoryObjectStore::new();
        assert!(store.delete("nothing").await.is_ok());
        assert!(store.delete("nothing").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_is_prefix_scoped() {
        let store = InMemoryObjectStore::new();
        for key in ["c_a", "c_b", "cz", "d_a", "c"] {
            store.put(key, Bytes::new()).await.unwrap();
        }

        let keys = store.list("c_").await.unwrap();
        assert_eq!(keys, vec!["c_a".to_string(), "c_b".to_string()]);

        let all = store.list("").await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_delete_many_reports_each_key() {
        let store = InMemoryObjectStore::new();
        store.put("x", Bytes::new()).await.unwrap();

        let keys = vec!["x".to_string(), "missing".to_string()];
        let results = store.delete_many(&keys).await;

        assert_eq!(results.get("x"), Some(&true));
        assert_eq!(results.get("missing"), Some(&true));
        assert!(store.is_empty().await);
    }
}
