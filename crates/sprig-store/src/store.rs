//! Versioned, checksum-verified model artifacts.
//!
//! Every version lives under `{model}/v{version}/` in one bucket. Upload writes the
//! checkpoint, then the side files, then `manifest.json`; a version is only
//! visible to `list_versions`, `latest_version` and `download` once its manifest
//! exists. Nothing is locked: concurrent uploads of the same version race and the
//! last manifest written wins.

use crate::checksum::{sha256_bytes_async, sha256_file_async};
use crate::config::{StoreConfig, VerifyMode};
use crate::error::{StoreError, StoreResult};
use crate::manifest::{manifest_key, object_key, version_prefix, Manifest, MANIFEST_FILE};
use crate::storage::{ObjectStorage, PutObject};
use crate::version::{VersionId, VersionScheme};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Optional parts of an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Explicit version, with or without the `v` prefix. Generated when absent.
    pub version: Option<String>,
    pub metadata: BTreeMap<String, Value>,
    pub side_files: Vec<PathBuf>,
}

/// Result of a download.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadedModel {
    pub checkpoint_path: PathBuf,
    /// Checksum of the downloaded file.
    pub checksum: String,
    pub checksum_matches: bool,
    pub manifest: Manifest,
    /// Side files that were fetched. Missing ones are skipped.
    pub side_files: Vec<PathBuf>,
}

pub struct ArtifactStore {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
    verify: VerifyMode,
    version_scheme: VersionScheme,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(storage: Arc<dyn ObjectStorage>, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            verify: VerifyMode::default(),
            version_scheme: VersionScheme::default(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let backend = config.build_backend()?;
        Ok(Self::new(Arc::new(backend), config.bucket.clone())
            .with_verify_mode(config.verify)
            .with_version_scheme(config.version_scheme))
    }

    #[must_use]
    pub fn with_verify_mode(mut self, verify: VerifyMode) -> Self {
        self.verify = verify;
        self
    }

    #[must_use]
    pub fn with_version_scheme(mut self, scheme: VersionScheme) -> Self {
        self.version_scheme = scheme;
        self
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        &self.storage
    }

    pub async fn ensure_ready(&self) -> StoreResult<()> {
        self.storage.ensure_bucket(&self.bucket).await
    }

    /// Upload a checkpoint and its side files as one version and return the manifest.
    ///
    /// Side files that cannot be read or stored are logged and left out of the
    /// manifest. Re-uploading an existing version overwrites it.
    pub async fn upload(&self, checkpoint_path: &Path, model_name: &str, opts: UploadOptions) -> StoreResult<Manifest> {
        validate_model_name(model_name)?;
        let file_meta = tokio::fs::metadata(checkpoint_path)
            .await
            .map_err(|_| StoreError::NotFound(checkpoint_path.display().to_string()))?;
        if !file_meta.is_file() {
            return Err(StoreError::NotFound(checkpoint_path.display().to_string()));
        }
        let file_name = local_file_name(checkpoint_path)?;
        if file_name == MANIFEST_FILE {
            return Err(StoreError::InvalidInput(format!("checkpoint must not be named {MANIFEST_FILE}")));
        }

        let version = match opts.version.as_deref() {
            Some(v) => VersionId::parse(v)?,
            None => VersionId::generate(self.version_scheme),
        };
        // The checksum covers exactly the bytes that are put.
        let data = Bytes::from(tokio::fs::read(checkpoint_path).await?);
        if data.is_empty() {
            return Err(StoreError::InvalidInput(format!("checkpoint {} is empty", checkpoint_path.display())));
        }
        let checksum = sha256_bytes_async(data.clone()).await?;
        let uploaded_at = Utc::now();

        let mut metadata = opts.metadata;
        metadata.insert("model_name".to_string(), Value::from(model_name));
        metadata.insert("version".to_string(), Value::from(version.raw()));
        metadata.insert("upload_time".to_string(), Value::from(uploaded_at.to_rfc3339()));
        metadata.insert("file_size".to_string(), Value::from(data.len()));
        metadata.insert("checksum".to_string(), Value::from(checksum.clone()));

        let model_key = object_key(model_name, &version, &file_name);
        let put = PutObject::default()
            .content_type("application/octet-stream")
            .with_metadata("model_name", model_name)
            .with_metadata("version", version.raw())
            .with_metadata("checksum", checksum.clone());
        let model_url = self
            .storage
            .put(&self.bucket, &model_key, data, put)
            .await
            .map_err(|e| StoreError::Upload { key: model_key.clone(), message: e.to_string() })?;
        tracing::info!(model = model_name, %version, key = %model_key, "checkpoint uploaded");

        let mut additional_files = Vec::new();
        for path in &opts.side_files {
            match self.upload_side_file(path, model_name, &version, &file_name).await {
                Ok(key) => additional_files.push(key),
                Err(e) => tracing::warn!(model = model_name, %version, path = %path.display(), "skipping side file: {e}"),
            }
        }

        let manifest = Manifest {
            model_name: model_name.to_string(),
            version: version.raw().to_string(),
            model_file: model_key,
            model_url,
            checksum,
            metadata,
            additional_files,
            created_at: uploaded_at,
        };

        let key = manifest_key(model_name, &version);
        let body = Bytes::from(serde_json::to_vec_pretty(&manifest)?);
        self.storage
            .put(&self.bucket, &key, body, PutObject::default().content_type("application/json"))
            .await
            .map_err(|e| StoreError::Upload { key: key.clone(), message: e.to_string() })?;
        tracing::info!(model = model_name, %version, checksum = %manifest.checksum, "version committed");

        Ok(manifest)
    }

    async fn upload_side_file(
        &self,
        path: &Path,
        model_name: &str,
        version: &VersionId,
        checkpoint_name: &str,
    ) -> StoreResult<String> {
        let name = local_file_name(path)?;
        if name == MANIFEST_FILE || name == checkpoint_name {
            return Err(StoreError::InvalidInput(format!("side file name '{name}' is reserved")));
        }
        let data = Bytes::from(tokio::fs::read(path).await?);
        let key = object_key(model_name, version, &name);
        self.storage
            .put(&self.bucket, &key, data, PutObject::default().with_metadata("version", version.raw()))
            .await?;
        Ok(key)
    }

    /// Fetch and parse the manifest of a version.
    pub async fn read_manifest(&self, model_name: &str, version: &str) -> StoreResult<Manifest> {
        validate_model_name(model_name)?;
        let version = VersionId::parse(version)?;
        let key = manifest_key(model_name, &version);

        let scratch = tempfile::TempDir::new()?;
        let local = scratch.path().join(MANIFEST_FILE);
        match self.storage.get(&self.bucket, &key, &local).await {
            Ok(()) => {}
            Err(StoreError::ObjectNotFound { .. }) => {
                return Err(StoreError::ManifestNotFound {
                    model_name: model_name.to_string(),
                    version: version.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        let bytes = tokio::fs::read(&local).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Download a version into `dest_dir`, verifying the checkpoint against the manifest.
    pub async fn download(
        &self,
        model_name: &str,
        version: &str,
        dest_dir: &Path,
        include_side_files: bool,
    ) -> StoreResult<DownloadedModel> {
        let manifest = self.read_manifest(model_name, version).await?;
        tokio::fs::create_dir_all(dest_dir).await?;

        let checkpoint_path = dest_dir.join(key_file_name(&manifest.model_file)?);
        self.storage.get(&self.bucket, &manifest.model_file, &checkpoint_path).await?;

        let checksum = sha256_file_async(&checkpoint_path).await?;
        let checksum_matches = checksum == manifest.checksum;
        if checksum_matches {
            tracing::info!(model = model_name, version = %manifest.version, path = %checkpoint_path.display(), "checkpoint verified");
        } else if self.verify == VerifyMode::Enforce {
            return Err(StoreError::IntegrityMismatch {
                key: manifest.model_file.clone(),
                expected: manifest.checksum.clone(),
                actual: checksum,
            });
        } else {
            tracing::warn!(
                key = %manifest.model_file,
                expected = %manifest.checksum,
                actual = %checksum,
                "checksum mismatch, keeping downloaded file"
            );
        }

        let mut side_files = Vec::new();
        if include_side_files {
            for key in &manifest.additional_files {
                let fetched = match key_file_name(key) {
                    Ok(name) => {
                        let path = dest_dir.join(name);
                        self.storage.get(&self.bucket, key, &path).await.map(|()| path)
                    }
                    Err(e) => Err(e),
                };
                match fetched {
                    Ok(path) => side_files.push(path),
                    Err(e) => tracing::warn!(key = %key, "side file not downloaded: {e}"),
                }
            }
        }

        Ok(DownloadedModel { checkpoint_path, checksum, checksum_matches, manifest, side_files })
    }

    /// Committed versions of a model, newest first.
    pub async fn list_versions(&self, model_name: &str) -> StoreResult<Vec<VersionId>> {
        validate_model_name(model_name)?;
        let prefix = format!("{model_name}/");
        let objects = self.storage.list(&self.bucket, &prefix).await?;

        let committed: BTreeSet<VersionId> = objects
            .iter()
            .filter_map(|obj| {
                let rest = obj.key.strip_prefix(&prefix)?;
                let (dir, file) = rest.split_once('/')?;
                (file == MANIFEST_FILE).then(|| VersionId::from_dir_name(dir)).flatten()
            })
            .collect();
        Ok(committed.into_iter().rev().collect())
    }

    pub async fn latest_version(&self, model_name: &str) -> StoreResult<Option<VersionId>> {
        Ok(self.list_versions(model_name).await?.into_iter().next())
    }

    /// Remove every object of a version and return how many were deleted.
    ///
    /// The manifest goes first so a partially deleted version is no longer
    /// resolvable. Objects already removed are not restored on failure.
    pub async fn delete_version(&self, model_name: &str, version: &str) -> StoreResult<usize> {
        validate_model_name(model_name)?;
        let version = VersionId::parse(version)?;
        let prefix = version_prefix(model_name, &version);
        let manifest = manifest_key(model_name, &version);

        let mut keys: Vec<String> = self.storage.list(&self.bucket, &prefix).await?.into_iter().map(|o| o.key).collect();
        keys.sort_by_key(|k| *k != manifest);

        let mut deleted = 0;
        let mut failed = 0;
        for key in &keys {
            match self.storage.delete(&self.bucket, key).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!(key = %key, "delete failed: {e}");
                }
            }
        }

        if failed > 0 {
            return Err(StoreError::PartialDelete { prefix, deleted, failed });
        }
        tracing::info!(model = model_name, %version, deleted, "version deleted");
        Ok(deleted)
    }
}

fn validate_model_name(model_name: &str) -> StoreResult<()> {
    if model_name.trim().is_empty() || model_name.contains('/') || model_name.starts_with('.') {
        return Err(StoreError::InvalidInput(format!("invalid model name '{model_name}'")));
    }
    Ok(())
}

fn local_file_name(path: &Path) -> StoreResult<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| StoreError::InvalidInput(format!("{} has no file name", path.display())))
}

/// Last segment of an object key, refused if it would escape the destination directory.
fn key_file_name(key: &str) -> StoreResult<&str> {
    match key.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => Ok(name),
        _ => Err(StoreError::InvalidInput(format!("object key '{key}' has no usable file name"))),
    }
}
