use crate::error::{TrainingError, TrainingResult};
use crate::model::Backbone;
use crate::optim::{OptimizerKind, SchedulerKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one training run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainingRunId(pub String);

impl TrainingRunId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TrainingRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TrainingRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingHyperParams {
    pub seed: u64,
    pub epochs: u32,
    /// Consecutive epochs without validation-accuracy improvement before stopping.
    pub early_stopping_patience: u32,
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub batch_size: u32,
    pub validation_split: f64,
    pub backbone: Backbone,
    pub optimizer: OptimizerKind,
    pub scheduler: SchedulerKind,
}

impl Default for TrainingHyperParams {
    fn default() -> Self {
        Self {
            seed: 42,
            epochs: 50,
            early_stopping_patience: 10,
            learning_rate: 1e-3,
            weight_decay: 1e-4,
            batch_size: 32,
            validation_split: 0.2,
            backbone: Backbone::Linear,
            optimizer: OptimizerKind::AdamW,
            scheduler: SchedulerKind::Cosine,
        }
    }
}

impl TrainingHyperParams {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.epochs == 0 {
            return Err(TrainingError::InvalidConfig("epochs must be >= 1".to_string()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidConfig("learning_rate must be > 0".to_string()));
        }
        if !self.weight_decay.is_finite() || self.weight_decay < 0.0 {
            return Err(TrainingError::InvalidConfig("weight_decay must be >= 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidConfig("batch_size must be >= 1".to_string()));
        }
        if !(self.validation_split > 0.0 && self.validation_split < 1.0) {
            return Err(TrainingError::InvalidConfig("validation_split must be in (0, 1)".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(TrainingHyperParams::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            TrainingHyperParams { epochs: 0, ..Default::default() },
            TrainingHyperParams { learning_rate: f64::NAN, ..Default::default() },
            TrainingHyperParams { batch_size: 0, ..Default::default() },
            TrainingHyperParams { validation_split: 1.0, ..Default::default() },
        ];
        for params in bad {
            assert!(params.validate().is_err(), "{params:?} should be rejected");
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: TrainingHyperParams = serde_json::from_str(r#"{"epochs": 3, "optimizer": "sgd"}"#).unwrap();
        assert_eq!(params.epochs, 3);
        assert_eq!(params.optimizer, OptimizerKind::Sgd);
        assert_eq!(params.early_stopping_patience, 10);
    }
}
