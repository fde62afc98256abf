/*!
 * Object storage.
 *
 * The pipeline only needs bucket/key puts and gets. Two backends are
 * provided:
 * - `memory`: process-local map, used by tests and dry runs
 * - `local`: one directory per bucket on disk
 */

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::app_config::{StorageBackendKind, StorageConfig};
use crate::errors::StorageError;

pub mod local;
pub mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

/// Content type of uploaded screenplays
pub const CONTENT_TYPE_XML: &str = "application/xml";
/// Content type of flattened scripts
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Content type of raw model responses
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Bucket/key object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Write an object, replacing any previous one under the same key.
    async fn put(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Read an object. Missing objects are `StorageError::NotFound`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;
}

/// Build the configured backend.
pub fn build_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackendKind::Memory => Arc::new(MemoryStore::new()),
        StorageBackendKind::Local => {
            let root: PathBuf = config.resolved_root_dir();
            Arc::new(LocalStore::new(root))
        }
    }
}

/// Reject bucket names and keys that would escape the backend's namespace.
pub(crate) fn validate_location(bucket: &str, key: &str) -> Result<(), StorageError> {
    if bucket.is_empty() || key.is_empty() {
        return Err(StorageError::InvalidLocation(format!(
            "bucket and key must be non-empty (got '{}/{}')",
            bucket, key
        )));
    }
    if bucket.contains('/') || bucket.contains('\\') || bucket == "." || bucket == ".." {
        return Err(StorageError::InvalidLocation(format!("invalid bucket name '{}'", bucket)));
    }
    if key.starts_with('/') || key.split(['/', '\\']).any(|part| part == "..") {
        return Err(StorageError::InvalidLocation(format!("invalid object key '{}'", key)));
    }
    Ok(())
}
