//! Sprig Store
//!
//! Versioned model artifacts on an object store:
//! - `ObjectStorage`, the bucket/key capabilities the store needs, and an
//!   `object_store`-backed implementation (memory, local filesystem, S3)
//! - `ArtifactStore` for upload, download, listing and deletion of versions
//! - Manifests and SHA-256 checksums that make downloads verifiable

pub mod backend;
pub mod checksum;
pub mod config;
pub mod error;
pub mod manifest;
pub mod storage;
pub mod store;
pub mod version;

pub use backend::{ObjectStoreBackend, S3Settings};
pub use checksum::{sha256_bytes, sha256_file};
pub use config::{BackendKind, StoreConfig, VerifyMode};
pub use error::{ErrorKind, StoreError, StoreResult};
pub use manifest::{Manifest, MANIFEST_FILE};
pub use storage::{ObjectStorage, ObjectSummary, PutObject};
pub use store::{ArtifactStore, DownloadedModel, UploadOptions};
pub use version::{VersionId, VersionScheme};
