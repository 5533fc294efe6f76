//! CLI configuration file support.
//!
//! Configuration precedence:
//! 1. CLI arguments (handled by clap)
//! 2. Environment variables (`S3_*`, `SPRIG_*`)
//! 3. Local config file (./.sprigrc)
//! 4. Global config file (~/.sprig/config.toml)
//! 5. Defaults

use serde::{Deserialize, Serialize};
use sprig_store::{BackendKind, StoreConfig, VerifyMode, VersionScheme};
use sprig_training::{Backbone, OptimizerKind, SchedulerKind, TrainingHyperParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub training: TrainingSection,

    #[serde(default)]
    pub output: OutputConfig,
}

/// `[storage]` table. Unset fields keep the store defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    pub backend: Option<BackendKind>,
    pub bucket: Option<String>,
    pub root: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub verify: Option<VerifyMode>,
    pub version_scheme: Option<VersionScheme>,
}

/// `[training]` table. Unset fields keep the hyperparameter defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingSection {
    pub epochs: Option<u32>,
    pub patience: Option<u32>,
    pub learning_rate: Option<f64>,
    pub weight_decay: Option<f64>,
    pub batch_size: Option<u32>,
    pub validation_split: Option<f64>,
    pub seed: Option<u64>,
    pub backbone: Option<Backbone>,
    pub optimizer: Option<OptimizerKind>,
    pub scheduler: Option<SchedulerKind>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Always use JSON output
    #[serde(default)]
    pub always_json: bool,
}

#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),
}

pub type CliConfigResult<T> = std::result::Result<T, CliConfigError>;

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> CliConfigResult<Self> {
        if !path.exists() {
            return Err(CliConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CliConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| CliConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".sprig")
            .join("config.toml")
    }

    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".sprigrc")
    }

    /// Global config, then local config on top. Missing files are skipped.
    pub fn discover_and_load() -> Self {
        let mut config = Self::default();

        if let Ok(global) = Self::load_from_file(&Self::default_global_path()) {
            config.merge(&global);
        }
        if let Ok(local) = Self::load_from_file(&Self::default_local_path()) {
            config.merge(&local);
        }

        config
    }

    /// An explicit `--config` file must exist and parse; otherwise discover.
    pub fn load(explicit: Option<&Path>) -> CliConfigResult<Self> {
        match explicit {
            Some(path) => {
                let mut config = Self::default();
                config.merge(&Self::load_from_file(path)?);
                Ok(config)
            }
            None => Ok(Self::discover_and_load()),
        }
    }

    /// Values set in `other` override values in `self`.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
        if other.output.always_json {
            self.output.always_json = true;
        }

        let (s, o) = (&mut self.storage, &other.storage);
        s.backend = o.backend.or(s.backend);
        s.bucket = o.bucket.clone().or_else(|| s.bucket.take());
        s.root = o.root.clone().or_else(|| s.root.take());
        s.endpoint = o.endpoint.clone().or_else(|| s.endpoint.take());
        s.region = o.region.clone().or_else(|| s.region.take());
        s.verify = o.verify.or(s.verify);
        s.version_scheme = o.version_scheme.or(s.version_scheme);

        let (t, o) = (&mut self.training, &other.training);
        t.epochs = o.epochs.or(t.epochs);
        t.patience = o.patience.or(t.patience);
        t.learning_rate = o.learning_rate.or(t.learning_rate);
        t.weight_decay = o.weight_decay.or(t.weight_decay);
        t.batch_size = o.batch_size.or(t.batch_size);
        t.validation_split = o.validation_split.or(t.validation_split);
        t.seed = o.seed.or(t.seed);
        t.backbone = o.backbone.or(t.backbone);
        t.optimizer = o.optimizer.or(t.optimizer);
        t.scheduler = o.scheduler.or(t.scheduler);
    }

    /// Store settings: defaults, then this file's `[storage]` table, then the environment.
    pub fn store_config(&self) -> anyhow::Result<StoreConfig> {
        let mut config = StoreConfig::default();
        let s = &self.storage;
        if let Some(backend) = s.backend {
            config.backend = backend;
        }
        if let Some(ref bucket) = s.bucket {
            config.bucket = bucket.clone();
        }
        if let Some(ref root) = s.root {
            config.root = root.clone();
        }
        if let Some(ref endpoint) = s.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(ref region) = s.region {
            config.region = region.clone();
        }
        if let Some(verify) = s.verify {
            config.verify = verify;
        }
        if let Some(scheme) = s.version_scheme {
            config.version_scheme = scheme;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn hyperparams(&self) -> TrainingHyperParams {
        let mut params = TrainingHyperParams::default();
        let t = &self.training;
        if let Some(v) = t.epochs {
            params.epochs = v;
        }
        if let Some(v) = t.patience {
            params.early_stopping_patience = v;
        }
        if let Some(v) = t.learning_rate {
            params.learning_rate = v;
        }
        if let Some(v) = t.weight_decay {
            params.weight_decay = v;
        }
        if let Some(v) = t.batch_size {
            params.batch_size = v;
        }
        if let Some(v) = t.validation_split {
            params.validation_split = v;
        }
        if let Some(v) = t.seed {
            params.seed = v;
        }
        if let Some(v) = t.backbone {
            params.backbone = v;
        }
        if let Some(v) = t.optimizer {
            params.optimizer = v;
        }
        if let Some(v) = t.scheduler {
            params.scheduler = v;
        }
        params
    }
}
