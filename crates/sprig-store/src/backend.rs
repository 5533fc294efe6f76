//! `ObjectStorage` on top of the `object_store` crate.

use crate::error::{StoreError, StoreResult};
use crate::storage::{ObjectStorage, ObjectSummary, PutObject};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Connection settings for an S3-compatible endpoint such as MinIO.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone)]
enum Flavor {
    Memory,
    Local { root: PathBuf },
    S3(S3Settings),
}

/// One `object_store` instance per bucket, built lazily and cached.
pub struct ObjectStoreBackend {
    flavor: Flavor,
    stores: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStoreBackend {
    #[must_use]
    pub fn memory() -> Self {
        Self::with_flavor(Flavor::Memory)
    }

    /// Buckets are directories under `root`.
    #[must_use]
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::with_flavor(Flavor::Local { root: root.into() })
    }

    #[must_use]
    pub fn s3(settings: S3Settings) -> Self {
        Self::with_flavor(Flavor::S3(settings))
    }

    fn with_flavor(flavor: Flavor) -> Self {
        Self { flavor, stores: RwLock::new(HashMap::new()) }
    }

    async fn store_for(&self, bucket: &str) -> StoreResult<Arc<dyn ObjectStore>> {
        if let Some(store) = self.stores.read().await.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let mut stores = self.stores.write().await;
        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }
        let store = self.build_store(bucket)?;
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }

    fn build_store(&self, bucket: &str) -> StoreResult<Arc<dyn ObjectStore>> {
        if bucket.is_empty() || bucket.contains('/') {
            return Err(StoreError::InvalidInput(format!("invalid bucket name '{bucket}'")));
        }
        Ok(match &self.flavor {
            Flavor::Memory => Arc::new(InMemory::new()),
            Flavor::Local { root } => {
                let dir = root.join(bucket);
                std::fs::create_dir_all(&dir)?;
                Arc::new(LocalFileSystem::new_with_prefix(&dir)?)
            }
            Flavor::S3(s3) => Arc::new(
                AmazonS3Builder::new()
                    .with_endpoint(&s3.endpoint)
                    .with_bucket_name(bucket)
                    .with_access_key_id(&s3.access_key)
                    .with_secret_access_key(&s3.secret_key)
                    .with_region(&s3.region)
                    .with_allow_http(true)
                    .with_virtual_hosted_style_request(false)
                    .build()?,
            ),
        })
    }

    /// The local filesystem store rejects object attributes, so they are dropped there.
    fn supports_attributes(&self) -> bool {
        !matches!(self.flavor, Flavor::Local { .. })
    }

    fn reference(&self, bucket: &str, key: &str) -> String {
        match &self.flavor {
            Flavor::Memory => format!("memory://{bucket}/{key}"),
            Flavor::Local { root } => format!("file://{}/{bucket}/{key}", root.display()),
            Flavor::S3(s3) => format!("{}/{bucket}/{key}", s3.endpoint.trim_end_matches('/')),
        }
    }
}

fn object_path(key: &str) -> StoreResult<ObjectPath> {
    ObjectPath::parse(key).map_err(|e| StoreError::InvalidInput(format!("invalid object key '{key}': {e}")))
}

fn not_found_as(bucket: &str, key: &str, err: object_store::Error) -> StoreError {
    match err {
        object_store::Error::NotFound { .. } => {
            StoreError::ObjectNotFound { bucket: bucket.to_string(), key: key.to_string() }
        }
        other => StoreError::ObjectStore(other),
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

#[async_trait]
impl ObjectStorage for ObjectStoreBackend {
    async fn ensure_bucket(&self, bucket: &str) -> StoreResult<()> {
        let store = self.store_for(bucket).await?;
        if let Flavor::S3(_) = self.flavor {
            // object_store cannot create buckets; probe that this one answers.
            let mut listing = store.list(None);
            listing
                .try_next()
                .await
                .map_err(|e| StoreError::Transport(format!("bucket '{bucket}' is not reachable: {e}")))?;
        }
        Ok(())
    }

    async fn put(&self, bucket: &str, key: &str, data: Bytes, opts: PutObject) -> StoreResult<String> {
        let store = self.store_for(bucket).await?;
        let path = object_path(key)?;

        let mut attributes = Attributes::new();
        if self.supports_attributes() {
            if let Some(content_type) = opts.content_type {
                attributes.insert(Attribute::ContentType, AttributeValue::from(content_type));
            }
            for (name, value) in opts.metadata {
                attributes.insert(Attribute::Metadata(Cow::Owned(name)), AttributeValue::from(value));
            }
        }

        let size = data.len();
        store
            .put_opts(&path, PutPayload::from(data), PutOptions { attributes, ..Default::default() })
            .await?;
        tracing::debug!(bucket, key, size, backend = self.backend_type(), "object stored");
        Ok(self.reference(bucket, key))
    }

    async fn get(&self, bucket: &str, key: &str, dest: &Path) -> StoreResult<()> {
        let store = self.store_for(bucket).await?;
        let path = object_path(key)?;
        let result = store.get(&path).await.map_err(|e| not_found_as(bucket, key, e))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let part = partial_path(dest);
        let mut file = tokio::fs::File::create(&part).await?;
        let mut stream = result.into_stream();
        let copied: StoreResult<()> = async {
            while let Some(chunk) = stream.try_next().await? {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = copied {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
        tokio::fs::rename(&part, dest).await?;
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectSummary>> {
        let store = self.store_for(bucket).await?;
        let prefix_path = if prefix.trim_matches('/').is_empty() { None } else { Some(object_path(prefix)?) };

        let metas: Vec<_> = store.list(prefix_path.as_ref()).try_collect().await?;
        let mut out: Vec<ObjectSummary> = metas
            .into_iter()
            .map(|meta| ObjectSummary {
                key: meta.location.to_string(),
                size: meta.size,
                last_modified: meta.last_modified,
                etag: meta.e_tag,
            })
            .filter(|summary| summary.key.starts_with(prefix))
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }

    async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let store = self.store_for(bucket).await?;
        match store.delete(&object_path(key)?).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        let store = self.store_for(bucket).await?;
        match store.head(&object_path(key)?).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn head_metadata(&self, bucket: &str, key: &str) -> StoreResult<HashMap<String, String>> {
        let store = self.store_for(bucket).await?;
        let result = store
            .get_opts(&object_path(key)?, GetOptions { head: true, ..Default::default() })
            .await
            .map_err(|e| not_found_as(bucket, key, e))?;

        Ok(result
            .attributes
            .iter()
            .filter_map(|(attr, value)| match attr {
                Attribute::Metadata(name) => Some((name.to_string(), value.to_string())),
                _ => None,
            })
            .collect())
    }

    fn backend_type(&self) -> &'static str {
        match self.flavor {
            Flavor::Memory => "memory",
            Flavor::Local { .. } => "local",
            Flavor::S3(_) => "s3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_put_get_list_delete() {
        let backend = ObjectStoreBackend::memory();
        let temp = TempDir::new().unwrap();

        let reference = backend
            .put("models", "demo/v1/a.json", Bytes::from_static(b"{}"), PutObject::default())
            .await
            .unwrap();
        assert_eq!(reference, "memory://models/demo/v1/a.json");
        assert!(backend.exists("models", "demo/v1/a.json").await.unwrap());

        let dest = temp.path().join("nested").join("a.json");
        backend.get("models", "demo/v1/a.json", &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"{}");

        let listed = backend.list("models", "demo/").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].size, 2);

        backend.delete("models", "demo/v1/a.json").await.unwrap();
        assert!(!backend.exists("models", "demo/v1/a.json").await.unwrap());
        backend.delete("models", "demo/v1/a.json").await.unwrap();
    }

    #[tokio::test]
    async fn test_buckets_are_isolated() {
        let backend = ObjectStoreBackend::memory();
        backend.put("a", "k", Bytes::from_static(b"1"), PutObject::default()).await.unwrap();
        assert!(!backend.exists("b", "k").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_keeps_metadata() {
        let backend = ObjectStoreBackend::memory();
        let opts = PutObject::default().content_type("application/json").with_metadata("version", "3");
        backend.put("models", "demo/v3/x", Bytes::from_static(b"x"), opts).await.unwrap();

        let meta = backend.head_metadata("models", "demo/v3/x").await.unwrap();
        assert_eq!(meta.get("version").map(String::as_str), Some("3"));
    }

    #[tokio::test]
    async fn test_local_backend_writes_under_bucket_dir() {
        let temp = TempDir::new().unwrap();
        let backend = ObjectStoreBackend::local(temp.path());
        backend.ensure_bucket("models").await.unwrap();
        let opts = PutObject::default().with_metadata("version", "1");
        backend.put("models", "demo/v1/f.bin", Bytes::from_static(b"abc"), opts).await.unwrap();

        assert!(temp.path().join("models/demo/v1/f.bin").is_file());
        assert!(backend.head_metadata("models", "demo/v1/f.bin").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let temp = TempDir::new().unwrap();
        let backend = ObjectStoreBackend::memory();
        let err = backend.get("models", "nope", &temp.path().join("x")).await.unwrap_err();
        assert!(matches!(err, StoreError::ObjectNotFound { ref key, .. } if key == "nope"));
        assert!(!temp.path().join("x.part").exists());
    }

    #[tokio::test]
    async fn test_list_prefix_respects_segments() {
        let backend = ObjectStoreBackend::memory();
        for key in ["demo/v1/a", "demo/v10/a", "demo2/v1/a"] {
            backend.put("models", key, Bytes::from_static(b"."), PutObject::default()).await.unwrap();
        }
        let keys: Vec<String> = backend.list("models", "demo/v1/").await.unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["demo/v1/a"]);
        assert_eq!(backend.list("models", "demo/").await.unwrap().len(), 2);
    }
}
