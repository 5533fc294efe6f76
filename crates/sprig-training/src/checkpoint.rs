use crate::error::TrainingResult;
use crate::metrics::TrainingHistory;
use crate::model::ModelState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKind {
    Latest,
    Best,
}

impl std::fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Latest => "latest",
            Self::Best => "best",
        })
    }
}

/// A model snapshot plus the provenance needed to serve or resume it.
///
/// `class_labels` order defines the logit-index to label mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: u32,
    pub val_accuracy: f64,
    pub class_labels: Vec<String>,
    pub model_state: ModelState,
    pub learning_rate: f64,
    pub history: TrainingHistory,
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Write the checkpoint next to `path` and rename it into place, so readers
    /// never observe a half-written file.
    pub fn save(&self, path: &Path) -> TrainingResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = tmp_path(path);
        if let Err(e) = std::fs::write(&tmp, json).and_then(|()| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn load(path: &Path) -> TrainingResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
