//! Key-value persistence behind share links.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;

/// Blob storage keyed by share id. Records are immutable once written.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, id: &str, blob: Value) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing was stored under `id`.
    async fn get(&self, id: &str) -> Result<Option<Value>, StoreError>;
}

#[async_trait]
impl<S: BlobStore + ?Sized> BlobStore for std::sync::Arc<S> {
    async fn put(&self, id: &str, blob: Value) -> Result<(), StoreError> {
        (**self).put(id, blob).await
    }

    async fn get(&self, id: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(id).await
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(&self, id: &str, blob: Value) -> Result<(), StoreError> {
        self.records.write().await.insert(id.to_string(), blob);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }
}

/// One `<id>.json` file per record.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self.root.join(format!("{id}.json")))
    }
}

/// Ids are lowercase hex digests; anything else could escape the directory.
pub fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty() && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

#[async_trait]
impl BlobStore for DirStore {
    async fn put(&self, id: &str, blob: Value) -> Result<(), StoreError> {
        let target = self.record_path(id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = self.root.join(format!(".{id}.json.tmp"));
        let bytes = serde_json::to_vec(&blob)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &target).await?;
        debug!(path = %target.display(), "record written");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Value>, StoreError> {
        let target = self.record_path(id)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
