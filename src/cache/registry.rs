//! Backend Registry Module
//!
//! Maps the configured backend tag (`CACHE_TYPE`) to a factory. The host
//! resolves the backend explicitly at startup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::cache::{BucketCache, CacheBackend, NullCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::storage::ObjectStore;

/// Builds a backend from its configuration and the object store client.
pub type BackendFactory = fn(&Config, Arc<dyn ObjectStore>) -> Result<Arc<dyn CacheBackend>>;

/// Tag of the bucket-backed cache.
pub const S3_BACKEND: &str = "s3";

/// Tag of the backend that caches nothing.
pub const NULL_BACKEND: &str = "null";

// == Backend Registry ==
/// Table of known backends keyed by configuration tag.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

fn build_bucket_cache(config: &Config, store: Arc<dyn ObjectStore>) -> Result<Arc<dyn CacheBackend>> {
    Ok(Arc::new(BucketCache::new(config, store)?))
}

fn build_null_cache(_config: &Config, _store: Arc<dyn ObjectStore>) -> Result<Arc<dyn CacheBackend>> {
    Ok(Arc::new(NullCache))
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in backends registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(S3_BACKEND, build_bucket_cache);
        registry.register(NULL_BACKEND, build_null_cache);
        registry
    }

    /// Registers `factory` under `tag`, replacing any previous one.
    pub fn register(&mut self, tag: impl Into<String>, factory: BackendFactory) {
        self.factories.insert(tag.into(), factory);
    }

    /// Returns true if `tag` has a factory.
    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Builds the backend named by `config.cache_type`.
    pub fn resolve(
        &self,
        config: &Config,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Arc<dyn CacheBackend>> {
        let factory = self
            .factories
            .get(&config.cache_type)
            .ok_or_else(|| CacheError::UnknownBackend(config.cache_type.clone()))?;

        let backend = factory(config, store)?;
        info!("Resolved cache backend {:?}", config.cache_type);
        Ok(backend)
    }
}
