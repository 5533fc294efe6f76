use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Broad failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments or a missing local file. Never retried.
    Input,
    /// The object store failed a put/get/list/delete.
    Transport,
    /// Downloaded content does not match the manifest checksum.
    Integrity,
    /// The version is incomplete or never existed.
    ManifestNotFound,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A local file the caller pointed at does not exist.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The object store has no object under this key.
    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("object store request failed: {0}")]
    Transport(String),

    #[error("manifest not found for {model_name}/{version}")]
    ManifestNotFound { model_name: String, version: String },

    #[error("checksum mismatch for {key}: expected {expected}, got {actual}")]
    IntegrityMismatch { key: String, expected: String, actual: String },

    #[error("deleted {deleted} objects under {prefix} but {failed} failed")]
    PartialDelete { prefix: String, deleted: usize, failed: usize },

    #[error("invalid store configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    ObjectStore(#[from] object_store::Error),
}

impl StoreError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::NotFound(_) | Self::Config(_) | Self::Json(_) => ErrorKind::Input,
            Self::Upload { .. }
            | Self::Transport(_)
            | Self::ObjectNotFound { .. }
            | Self::PartialDelete { .. }
            | Self::Io(_)
            | Self::ObjectStore(_) => ErrorKind::Transport,
            Self::IntegrityMismatch { .. } => ErrorKind::Integrity,
            Self::ManifestNotFound { .. } => ErrorKind::ManifestNotFound,
        }
    }
}
