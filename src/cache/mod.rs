//! Cache Module
//!
//! Expiring cache entries stored as envelope objects in a bucket.

mod backend;
mod entry;
pub mod envelope;
mod key;
mod null;
pub mod registry;
mod traits;


// Re-export public types
pub use backend::BucketCache;
pub use entry::{current_timestamp_ms, CacheEntry, Expiry, Timeout};
pub use envelope::EnvelopeError;
pub use key::KeyCodec;
pub use null::NullCache;
pub use registry::BackendRegistry;
pub use traits::CacheBackend;

// == Public Constants ==
/// Maximum allowed logical key length in bytes (S3 caps keys at 1024)
pub const MAX_KEY_LENGTH: usize = 1024;
