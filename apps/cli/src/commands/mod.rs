//! Command implementations for the sprig CLI.

pub mod download;
pub mod train;
pub mod types;
pub mod upload;
pub mod versions;

use crate::config::CliConfig;
use anyhow::{Context, Result};
use sprig_store::ArtifactStore;

/// Build the artifact store from configuration and make sure its bucket is usable.
pub async fn open_store(config: &CliConfig) -> Result<ArtifactStore> {
    let store_config = config.store_config().context("Invalid storage configuration")?;
    let store = ArtifactStore::from_config(&store_config).context("Failed to open artifact store")?;
    store.ensure_ready().await.with_context(|| format!("Bucket '{}' is not usable", store.bucket()))?;
    Ok(store)
}
