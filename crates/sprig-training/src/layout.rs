use crate::error::TrainingResult;
use std::path::{Path, PathBuf};

/// Filesystem layout for one training output directory.
///
/// ```text
/// <root>/checkpoints/latest_checkpoint.json   overwritten every epoch
/// <root>/checkpoints/best_model.json          overwritten on improvement
/// <root>/logs/training_history.json           written when the run exits
/// ```
#[derive(Debug, Clone)]
pub struct TrainingLayout {
    root: PathBuf,
}

impl TrainingLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn checkpoints_dir(&self) -> PathBuf {
        self.root.join("checkpoints")
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    #[must_use]
    pub fn latest_checkpoint_path(&self) -> PathBuf {
        self.checkpoints_dir().join("latest_checkpoint.json")
    }

    #[must_use]
    pub fn best_checkpoint_path(&self) -> PathBuf {
        self.checkpoints_dir().join("best_model.json")
    }

    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.logs_dir().join("training_history.json")
    }

    pub fn ensure_dirs(&self) -> TrainingResult<()> {
        std::fs::create_dir_all(self.checkpoints_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let temp = TempDir::new().unwrap();
        let layout = TrainingLayout::new(temp.path().join("run"));
        layout.ensure_dirs().unwrap();

        assert!(layout.checkpoints_dir().is_dir());
        assert!(layout.logs_dir().is_dir());
        assert!(layout.best_checkpoint_path().starts_with(layout.checkpoints_dir()));
        assert!(layout.history_path().to_string_lossy().ends_with("training_history.json"));
    }
}
