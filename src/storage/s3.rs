//! S3 object store on top of the AWS SDK for Rust.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::{debug, error};

use super::{ObjectStore, StorageError};
use crate::config::Config;

// == S3 Object Store ==
/// [`ObjectStore`] bound to a single S3 bucket.
///
/// Retries, connection pooling and request timeouts are whatever the SDK's
/// defaults provide; nothing is layered on top here.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Builds a client from the default credential chain.
    ///
    /// When `config.endpoint_url` is set (LocalStack, MinIO), requests go to
    /// that endpoint with path-style addressing.
    pub async fn connect(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(ref endpoint) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        debug!(
            "S3 client ready for bucket {} (endpoint override: {:?})",
            config.bucket, config.endpoint_url
        );

        Self::from_client(S3Client::from_conf(s3_config), config.bucket.clone())
    }

    /// Wraps an already configured client.
    pub fn from_client(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Returns the bucket this store writes to.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn classify<E>(&self, key: &str, err: E) -> StorageError
    where
        E: ProvideErrorMetadata + std::fmt::Display,
    {
        let message = err.message().unwrap_or_default().to_string();
        match err.code() {
            Some("AccessDenied") => StorageError::AccessDenied {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message,
            },
            Some("NoSuchBucket") => StorageError::NoSuchBucket {
                bucket: self.bucket.clone(),
            },
            Some(code) => StorageError::Other {
                message: format!("{code}: {message}"),
            },
            None => StorageError::network(key, err.to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|err| self.classify(key, err.into_service_error()))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(self.classify(key, service_err));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::network(key, err.to_string()))?;

        Ok(Some(body.into_bytes()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| self.classify(key, err.into_service_error()))?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);

            if let Some(ref token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|err| self.classify(prefix, err.into_service_error()))?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(str::to_string)),
            );

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        Ok(keys)
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<HashMap<String, bool>, StorageError> {
        let mut results: HashMap<String, bool> =
            keys.iter().map(|key| (key.clone(), true)).collect();
        let Some(first) = keys.first() else {
            return Ok(results);
        };

        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| StorageError::Other {
                message: err.to_string(),
            })?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|err| StorageError::Other {
                message: err.to_string(),
            })?;

        let output = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|err| self.classify(first, err.into_service_error()))?;

        for failure in output.errors() {
            let key = failure.key().unwrap_or_default();
            error!(
                "Could not delete key {} due to error {}: {}",
                key,
                failure.code().unwrap_or("unknown"),
                failure.message().unwrap_or_default()
            );
            results.insert(key.to_string(), false);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_store() -> S3ObjectStore {
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        S3ObjectStore::from_client(S3Client::from_conf(s3_config), "library-of-alexandria")
    }

    #[test]
    fn test_from_client_keeps_bucket() {
        let store = offline_store();
        assert_eq!(store.bucket(), "library-of-alexandria");
    }

    #[test]
    fn test_batches_follow_delete_objects_limit() {
        assert_eq!(offline_store().max_delete_batch(), 1000);
    }

    #[tokio::test]
    async fn test_delete_many_with_no_keys_sends_nothing() {
        let store = offline_store();
        let results = store.delete_many(&[]).await;
        assert!(results.is_empty());
    }
}
