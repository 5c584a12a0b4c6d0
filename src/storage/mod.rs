//! Object Storage Module
//!
//! The byte-level storage layer the cache sits on top of: a small async
//! object-store contract plus an S3 implementation and an in-memory one.

mod error;
mod memory;
mod s3;
mod traits;

pub use error::StorageError;
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;
pub use traits::{ObjectStore, DEFAULT_DELETE_BATCH};
