//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Default timeout in seconds for entries written without an explicit one.
pub const DEFAULT_TIMEOUT: i64 = 300;

/// Backend options.
///
/// Only `purge_expired_on_read` is recognized; any other key in the source
/// mapping is ignored rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Delete expired (or corrupt) objects when a read finds them
    pub purge_expired_on_read: bool,
}

impl CacheOptions {
    /// Parses options from a JSON object, e.g. `{"purge_expired_on_read": true}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| CacheError::Config(format!("CACHE_OPTIONS is not a valid options object: {e}")))
    }
}

/// Cache configuration parameters.
///
/// Immutable once a backend has been built from it; every backend instance
/// owns its own copy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry tag of the backend to build (`s3`, `null`)
    pub cache_type: String,
    /// Bucket holding the cache objects
    pub bucket: String,
    /// Prefix applied to every physical key
    pub key_prefix: String,
    /// Default timeout in seconds, `0` or below means never expire
    pub default_timeout: i64,
    /// Endpoint override for the object store (LocalStack, MinIO)
    pub endpoint_url: Option<String>,
    /// Region used by the S3 client
    pub region: String,
    /// Backend options
    pub options: CacheOptions,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a config for `bucket` with every other field at its default.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Sets the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets the default timeout in seconds.
    pub fn with_default_timeout(mut self, seconds: i64) -> Self {
        self.default_timeout = seconds;
        self
    }

    /// Sets the backend options.
    pub fn with_options(mut self, options: CacheOptions) -> Self {
        self.options = options;
        self
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TYPE` - Backend registry tag (default: s3)
    /// - `CACHE_S3_BUCKET` - Bucket name (default: empty, rejected by the s3 backend)
    /// - `CACHE_KEY_PREFIX` - Key prefix (default: empty)
    /// - `CACHE_DEFAULT_TIMEOUT` - Default timeout in seconds (default: 300)
    /// - `CACHE_S3_ENDPOINT_URL` - Object store endpoint override (default: none)
    /// - `CACHE_S3_REGION` - S3 region (default: us-east-1)
    /// - `CACHE_OPTIONS` - JSON options object (default: {})
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let options = match env::var("CACHE_OPTIONS") {
            Ok(raw) if !raw.trim().is_empty() => CacheOptions::from_json(&raw)?,
            _ => CacheOptions::default(),
        };

        Ok(Self {
            cache_type: env::var("CACHE_TYPE").unwrap_or(defaults.cache_type),
            bucket: env::var("CACHE_S3_BUCKET").unwrap_or_default(),
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or_default(),
            default_timeout: env::var("CACHE_DEFAULT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_timeout),
            endpoint_url: env::var("CACHE_S3_ENDPOINT_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            region: env::var("CACHE_S3_REGION").unwrap_or(defaults.region),
            options,
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        })
    }

    /// Rejects a configuration that names no bucket.
    pub fn require_bucket(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(CacheError::Config(
                "You must specify CACHE_S3_BUCKET in your config".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_type: "s3".to_string(),
            bucket: String::new(),
            key_prefix: String::new(),
            default_timeout: DEFAULT_TIMEOUT,
            endpoint_url: None,
            region: "us-east-1".to_string(),
            options: CacheOptions::default(),
            server_port: 3000,
        }
    }
}
