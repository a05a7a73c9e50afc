use super::{ObjectInfo, ObjectStore, ObjectStoreError, validate_key, validate_prefix};
use crate::utils::to_object_key;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Stores objects as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn scan(root: &Path, prefix: &str) -> Result<Vec<ObjectInfo>, ObjectStoreError> {
        if !root.exists() {
            return Ok(Vec::new());
        }
        let mut objects = Vec::new();
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let key = to_object_key(relative);
            if !key.starts_with(prefix) {
                continue;
            }
            let metadata = entry.metadata().map_err(std::io::Error::from)?;
            let last_modified = metadata
                .modified()
                .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
            objects.push(ObjectInfo {
                key,
                size: metadata.len(),
                last_modified,
            });
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn ensure_ready(&self) -> Result<(), ObjectStoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        info!("Object storage ready at {}", self.root.display());
        Ok(())
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectStoreError> {
        let path = self.path_of(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored object {key} ({} bytes)", bytes.len());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        let path = self.path_of(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, ObjectStoreError> {
        validate_prefix(prefix)?;
        let root = self.root.clone();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || Self::scan(&root, &prefix))
            .await
            .map_err(std::io::Error::other)?
    }

    async fn delete(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let path = self.path_of(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, ObjectStoreError> {
        let mut removed = 0;
        for object in self.list(prefix).await? {
            if self.delete(&object.key).await? {
                removed += 1;
            }
        }
        // Drop the now empty directory of a `{id}/` prefix.
        let dir = prefix.trim_end_matches('/');
        if !dir.is_empty() && prefix.ends_with('/') {
            if let Err(e) = tokio::fs::remove_dir(self.root.join(dir)).await {
                if !matches!(e.kind(), ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty) {
                    debug!("Could not remove directory {dir}: {e}");
                }
            }
        }
        Ok(removed)
    }
}
