mod local;
mod memory;
mod presign;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
pub use presign::{PresignError, UrlSigner};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Object store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Flat key/value blob storage. Keys are `/` separated relative paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn ensure_ready(&self) -> Result<(), ObjectStoreError>;

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectStoreError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError>;

    /// Objects whose key starts with `prefix`, sorted by key.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, ObjectStoreError>;

    /// Returns whether an object was removed. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<bool, ObjectStoreError>;

    /// Remove everything under `prefix`, returning the number of objects removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, ObjectStoreError> {
        let mut removed = 0;
        for object in self.list(prefix).await? {
            if self.delete(&object.key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Rejects keys that could escape the store root.
pub fn validate_key(key: &str) -> Result<(), ObjectStoreError> {
    if key.is_empty() || key.ends_with('/') {
        return Err(ObjectStoreError::InvalidKey(key.to_string()));
    }
    validate_prefix(key)
}

/// Like [`validate_key`], but the empty prefix and a trailing `/` are allowed.
pub fn validate_prefix(prefix: &str) -> Result<(), ObjectStoreError> {
    let invalid = prefix.starts_with('/')
        || prefix.contains('\\')
        || prefix.contains('\0')
        || prefix
            .trim_end_matches('/')
            .split('/')
            .any(|part| part == ".." || part == "." || (part.is_empty() && !prefix.is_empty()));
    if invalid {
        return Err(ObjectStoreError::InvalidKey(prefix.to_string()));
    }
    Ok(())
}
