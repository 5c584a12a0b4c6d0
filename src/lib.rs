//! Bucket Cache - A cache backend stored in an S3-compatible bucket
//!
//! Entries are written as self-describing envelopes carrying their own
//! absolute expiry, so expiration works without any server-side TTL.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use api::AppState;
pub use cache::{BackendRegistry, BucketCache, CacheBackend, Timeout};
pub use config::{CacheOptions, Config};
pub use error::CacheError;
pub use storage::{InMemoryObjectStore, ObjectStore, S3ObjectStore};
