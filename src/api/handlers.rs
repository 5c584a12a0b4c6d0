//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{BackendRegistry, CacheBackend, Timeout};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::requests::validate_key;
use crate::models::{
    BulkResponse, ClearResponse, CounterResponse, DeleteResponse, DeltaRequest, GetManyResponse,
    GetResponse, HasResponse, HealthResponse, KeysRequest, SetManyRequest, SetRequest,
    SetResponse,
};
use crate::storage::ObjectStore;

/// Application state shared across all handlers.
///
/// Backends are stateless, so the cache is shared without a lock.
#[derive(Clone)]
pub struct AppState {
    /// The resolved cache backend
    pub cache: Arc<dyn CacheBackend>,
}

impl AppState {
    /// Creates a new AppState around a backend.
    pub fn new(cache: Arc<dyn CacheBackend>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Resolves `config.cache_type` through the default backend registry.
    pub fn from_config(config: &Config, store: Arc<dyn ObjectStore>) -> Result<Self> {
        let cache = BackendRegistry::with_defaults().resolve(config, store)?;
        Ok(Self::new(cache))
    }
}

fn check_key(key: &str) -> Result<()> {
    match validate_key(key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair, replacing any existing entry.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let timeout = req.timeout();
    let stored = state.cache.set(&req.key, req.value, timeout).await?;

    Ok(Json(SetResponse::new(req.key, stored)))
}

/// Handler for PUT /add
///
/// Stores a key-value pair only if the key holds no live entry.
pub async fn add_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let timeout = req.timeout();
    let stored = state.cache.add(&req.key, req.value, timeout).await?;

    Ok(Json(SetResponse::new(req.key, stored)))
}

/// Handler for GET /get/:key
///
/// A miss (absent, expired or unreadable entry) is a 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    check_key(&key)?;

    match state.cache.get(&key).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /has/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HasResponse>> {
    check_key(&key)?;

    let exists = state.cache.has(&key).await?;
    Ok(Json(HasResponse { key, exists }))
}

/// Handler for DELETE /del/:key
///
/// Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    check_key(&key)?;

    let deleted = state.cache.delete(&key).await?;
    Ok(Json(DeleteResponse { key, deleted }))
}

/// Handler for POST /get_many
pub async fn get_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<GetManyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let found = state.cache.get_dict(&req.keys).await;
    Ok(Json(GetManyResponse::from_lookups(&req.keys, found)))
}

/// Handler for PUT /set_many
pub async fn set_many_handler(
    State(state): State<AppState>,
    Json(req): Json<SetManyRequest>,
) -> Result<Json<BulkResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let timeout = Timeout::from(req.timeout);
    let results = state
        .cache
        .set_many(req.entries.into_iter().collect(), timeout)
        .await;
    Ok(Json(BulkResponse { results }))
}

/// Handler for POST /delete_many
pub async fn delete_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<BulkResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let results = state.cache.delete_many(&req.keys).await?;
    Ok(Json(BulkResponse { results }))
}

/// Handler for POST /clear
///
/// Removes every entry under the configured prefix.
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state.cache.clear().await?;
    Ok(Json(ClearResponse { removed }))
}

/// Handler for POST /incr/:key
///
/// The body is optional and defaults to a delta of 1.
pub async fn incr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Option<Json<DeltaRequest>>,
) -> Result<Json<CounterResponse>> {
    check_key(&key)?;

    let Json(req) = body.unwrap_or_default();
    let value = state.cache.incr(&key, req.delta).await?;
    Ok(Json(CounterResponse { key, value }))
}

/// Handler for POST /decr/:key
pub async fn decr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Option<Json<DeltaRequest>>,
) -> Result<Json<CounterResponse>> {
    check_key(&key)?;

    let Json(req) = body.unwrap_or_default();
    let value = state.cache.decr(&key, req.delta).await?;
    Ok(Json(CounterResponse { key, value }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryObjectStore;
    use serde_json::json;

    fn test_state() -> AppState {
        let config = Config::new("bucket").with_key_prefix("c_");
        AppState::from_config(&config, Arc::new(InMemoryObjectStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "test_key".to_string(),
            value: json!({"v": 1}),
            timeout: None,
        };
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.unwrap().stored);

        let response = get_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"v": 1}));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(test_state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_handler_keeps_existing() {
        let state = test_state();
        let req = |value: &str| SetRequest {
            key: "k".to_string(),
            value: json!(value),
            timeout: None,
        };

        let first = add_handler(State(state.clone()), Json(req("one"))).await.unwrap();
        let second = add_handler(State(state.clone()), Json(req("two"))).await.unwrap();
        assert!(first.stored);
        assert!(!second.stored);
    }

    #[tokio::test]
    async fn test_delete_handler_is_idempotent() {
        let state = test_state();

        let first = delete_handler(State(state.clone()), Path("gone".to_string())).await;
        let second = delete_handler(State(state), Path("gone".to_string())).await;
        assert!(first.unwrap().deleted);
        assert!(second.unwrap().deleted);
    }

    #[tokio::test]
    async fn test_incr_handler_default_delta() {
        let state = test_state();

        let response = incr_handler(State(state.clone()), Path("n".to_string()), None)
            .await
            .unwrap();
        assert_eq!(response.value, 1);

        let response = decr_handler(
            State(state),
            Path("n".to_string()),
            Some(Json(DeltaRequest { delta: 4 })),
        )
        .await
        .unwrap();
        assert_eq!(response.value, -3);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let req = SetRequest {
            key: "".to_string(),
            value: json!("value"),
            timeout: None,
        };
        let result = set_handler(State(test_state()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
