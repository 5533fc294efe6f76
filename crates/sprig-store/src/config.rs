//! Store configuration and environment overrides.

use crate::backend::{ObjectStoreBackend, S3Settings};
use crate::error::{StoreError, StoreResult};
use crate::version::VersionScheme;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    #[default]
    Local,
    S3,
}

impl FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "local" => Ok(Self::Local),
            "s3" | "minio" => Ok(Self::S3),
            other => Err(StoreError::Config(format!("unknown storage backend '{other}'"))),
        }
    }
}

/// What a download does when the checkpoint checksum does not match the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Log a warning and return the file anyway.
    #[default]
    Warn,
    /// Fail with `StoreError::IntegrityMismatch`.
    Enforce,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub bucket: String,
    /// Root directory for the local backend.
    pub root: PathBuf,
    pub endpoint: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: String,
    pub verify: VerifyMode,
    pub version_scheme: VersionScheme,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            bucket: "models".to_string(),
            root: PathBuf::from(".sprig/store"),
            endpoint: "http://localhost:9000".to_string(),
            access_key: None,
            secret_key: None,
            region: "us-east-1".to_string(),
            verify: VerifyMode::Warn,
            version_scheme: VersionScheme::Timestamp,
        }
    }
}

impl StoreConfig {
    /// Defaults with process environment overrides applied.
    pub fn from_env() -> StoreResult<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `S3_*` and `SPRIG_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> StoreResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = get("SPRIG_STORAGE") {
            self.backend = backend.parse()?;
        }
        if let Some(root) = get("SPRIG_STORAGE_ROOT") {
            self.root = PathBuf::from(root);
        }
        if let Some(bucket) = get("SPRIG_BUCKET") {
            self.bucket = bucket;
        }
        if let Some(endpoint) = get("S3_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(access_key) = get("S3_ACCESS_KEY") {
            self.access_key = Some(access_key);
        }
        if let Some(secret_key) = get("S3_SECRET_KEY") {
            self.secret_key = Some(secret_key);
        }
        if let Some(region) = get("S3_REGION") {
            self.region = region;
        }
        Ok(())
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.bucket.trim().is_empty() || self.bucket.contains('/') {
            return Err(StoreError::Config(format!("invalid bucket name '{}'", self.bucket)));
        }
        if self.backend == BackendKind::S3 {
            if self.access_key.is_none() || self.secret_key.is_none() {
                return Err(StoreError::Config("s3 backend requires S3_ACCESS_KEY and S3_SECRET_KEY".to_string()));
            }
            if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
                return Err(StoreError::Config(format!("s3 endpoint must be an http(s) URL, got '{}'", self.endpoint)));
            }
        }
        Ok(())
    }

    pub fn build_backend(&self) -> StoreResult<ObjectStoreBackend> {
        self.validate()?;
        Ok(match self.backend {
            BackendKind::Memory => ObjectStoreBackend::memory(),
            BackendKind::Local => ObjectStoreBackend::local(self.root.clone()),
            BackendKind::S3 => ObjectStoreBackend::s3(S3Settings {
                endpoint: self.endpoint.clone(),
                access_key: self.access_key.clone().unwrap_or_default(),
                secret_key: self.secret_key.clone().unwrap_or_default(),
                region: self.region.clone(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.bucket, "models");
        assert_eq!(config.verify, VerifyMode::Warn);
        assert_eq!(config.version_scheme, VersionScheme::Timestamp);
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = StoreConfig::default();
        config
            .apply_env(lookup(&[
                ("SPRIG_STORAGE", "s3"),
                ("S3_ENDPOINT", "http://minio:9000"),
                ("S3_ACCESS_KEY", "key"),
                ("S3_SECRET_KEY", "secret"),
                ("SPRIG_BUCKET", "plants"),
                ("S3_REGION", ""),
            ]))
            .unwrap();

        assert_eq!(config.backend, BackendKind::S3);
        assert_eq!(config.endpoint, "http://minio:9000");
        assert_eq!(config.bucket, "plants");
        assert_eq!(config.region, "us-east-1");
        config.validate().unwrap();
    }

    #[test]
    fn test_s3_requires_credentials() {
        let config = StoreConfig { backend: BackendKind::S3, ..StoreConfig::default() };
        assert!(matches!(config.validate(), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let mut config = StoreConfig::default();
        assert!(config.apply_env(lookup(&[("SPRIG_STORAGE", "ftp")])).is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"backend":"memory","verify":"enforce"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.verify, VerifyMode::Enforce);
        assert_eq!(config.bucket, "models");
    }
}
