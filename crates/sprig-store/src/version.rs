use crate::error::{StoreError, StoreResult};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How versions are named when the caller does not supply one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionScheme {
    /// `YYYYMMDD_HHMMSS`. Two uploads of one model in the same second share a version.
    #[default]
    Timestamp,
    /// The timestamp plus a short random suffix.
    TimestampUnique,
}

impl FromStr for VersionScheme {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(Self::Timestamp),
            "timestamp-unique" => Ok(Self::TimestampUnique),
            other => Err(StoreError::Config(format!("unknown version scheme '{other}'"))),
        }
    }
}

/// A model version. Stored under the directory `v{raw}`; both `"3"` and `"v3"` name the same version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionId(String);

impl VersionId {
    pub fn parse(input: &str) -> StoreResult<Self> {
        let raw = input.trim();
        let raw = raw.strip_prefix('v').unwrap_or(raw);
        if raw.is_empty() {
            return Err(StoreError::InvalidInput(format!("invalid version '{input}'")));
        }
        if raw.contains('/') || raw.chars().any(char::is_whitespace) {
            return Err(StoreError::InvalidInput(format!(
                "version '{input}' must not contain '/' or whitespace"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn generate(scheme: VersionScheme) -> Self {
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        match scheme {
            VersionScheme::Timestamp => Self(stamp),
            VersionScheme::TimestampUnique => {
                let suffix = uuid::Uuid::new_v4().simple().to_string();
                Self(format!("{stamp}_{}", &suffix[..8]))
            }
        }
    }

    /// The version as the caller wrote it, without the `v` prefix.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Directory segment, e.g. `v20240101_120000`.
    #[must_use]
    pub fn dir_name(&self) -> String {
        format!("v{}", self.0)
    }

    /// Recognise a listing path segment as a version directory.
    #[must_use]
    pub fn from_dir_name(segment: &str) -> Option<Self> {
        let raw = segment.strip_prefix('v')?;
        (!raw.is_empty()).then(|| Self(raw.to_string()))
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for VersionId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
