use super::{ObjectInfo, ObjectStore, ObjectStoreError, validate_key, validate_prefix};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, (Vec<u8>, DateTime<Utc>)>>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn ensure_ready(&self) -> Result<(), ObjectStoreError> {
        Ok(())
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectStoreError> {
        validate_key(key)?;
        self.objects
            .write()
            .await
            .insert(key.to_string(), (bytes.to_vec(), Utc::now()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        validate_key(key)?;
        Ok(self.objects.read().await.get(key).map(|(b, _)| b.clone()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, ObjectStoreError> {
        validate_prefix(prefix)?;
        let objects = self.objects.read().await;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, (bytes, at))| ObjectInfo {
                key: key.clone(),
                size: bytes.len() as u64,
                last_modified: *at,
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<bool, ObjectStoreError> {
        validate_key(key)?;
        Ok(self.objects.write().await.remove(key).is_some())
    }
}
