//! The object-store capabilities the artifact store is built on.

use crate::error::StoreResult;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Optional attributes attached to an object on write.
#[derive(Debug, Clone, Default)]
pub struct PutObject {
    pub content_type: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl PutObject {
    #[must_use]
    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// One entry of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub etag: Option<String>,
}

/// A bucketed key/value object store.
///
/// Keys use forward slashes. Implementations must be safe to share across tasks.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Make sure `bucket` can be written to, creating it where the backend allows.
    async fn ensure_bucket(&self, bucket: &str) -> StoreResult<()>;

    /// Store `data` under `key` and return a reference that resolves to it.
    async fn put(&self, bucket: &str, key: &str, data: Bytes, opts: PutObject) -> StoreResult<String>;

    /// Stream the object at `key` into the local file `dest`, replacing it.
    async fn get(&self, bucket: &str, key: &str, dest: &Path) -> StoreResult<()>;

    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectSummary>>;

    async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()>;

    async fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool>;

    /// User metadata stored with the object. Empty on backends without attribute support.
    async fn head_metadata(&self, bucket: &str, key: &str) -> StoreResult<HashMap<String, String>>;

    fn backend_type(&self) -> &'static str;
}
