use crate::error::StoreResult;
use crate::version::VersionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const MANIFEST_FILE: &str = "manifest.json";

/// The record that commits a model version. A version without one is not resolvable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub model_name: String,
    /// Version without the `v` prefix.
    pub version: String,
    /// Object key of the checkpoint.
    pub model_file: String,
    pub model_url: String,
    pub checksum: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Object keys of side files that were uploaded with the checkpoint.
    #[serde(default)]
    pub additional_files: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Manifest {
    pub fn version_id(&self) -> StoreResult<VersionId> {
        VersionId::parse(&self.version)
    }
}

/// `{model}/v{version}/`
#[must_use]
pub fn version_prefix(model_name: &str, version: &VersionId) -> String {
    format!("{model_name}/{}/", version.dir_name())
}

#[must_use]
pub fn object_key(model_name: &str, version: &VersionId, file_name: &str) -> String {
    format!("{}{file_name}", version_prefix(model_name, version))
}

#[must_use]
pub fn manifest_key(model_name: &str, version: &VersionId) -> String {
    object_key(model_name, version, MANIFEST_FILE)
}
