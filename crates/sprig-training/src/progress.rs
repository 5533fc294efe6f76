use crate::checkpoint::CheckpointKind;
use crate::job::TrainingRunId;
use crate::metrics::EpochMetrics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { run_id: TrainingRunId, max_epochs: u32, train_samples: usize, val_samples: usize },
    EpochCompleted { run_id: TrainingRunId, metrics: EpochMetrics, is_best: bool },
    CheckpointFailed { run_id: TrainingRunId, epoch: u32, kind: CheckpointKind, message: String },
    EarlyStopped { run_id: TrainingRunId, epoch: u32, best_epoch: u32, best_val_accuracy: f64 },
    Finished { run_id: TrainingRunId, epochs_run: u32, best_epoch: u32, best_val_accuracy: f64 },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Renders progress through `tracing`.
#[derive(Debug, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { run_id, max_epochs, train_samples, val_samples } => {
                tracing::info!(%run_id, max_epochs, train_samples, val_samples, "training started");
            }
            ProgressEvent::EpochCompleted { run_id, metrics, is_best } => {
                tracing::info!(
                    %run_id,
                    epoch = metrics.epoch,
                    lr = metrics.learning_rate,
                    is_best,
                    "train loss {:.4} acc {:.2}% | val loss {:.4} acc {:.2}%",
                    metrics.train_loss,
                    metrics.train_accuracy * 100.0,
                    metrics.val_loss,
                    metrics.val_accuracy * 100.0
                );
            }
            ProgressEvent::CheckpointFailed { run_id, epoch, kind, message } => {
                tracing::warn!(%run_id, epoch, %kind, "checkpoint write failed, training continues: {message}");
            }
            ProgressEvent::EarlyStopped { run_id, epoch, best_epoch, best_val_accuracy } => {
                tracing::info!(
                    %run_id,
                    epoch,
                    best_epoch,
                    "early stopping triggered, best val acc {:.2}%",
                    best_val_accuracy * 100.0
                );
            }
            ProgressEvent::Finished { run_id, epochs_run, best_epoch, best_val_accuracy } => {
                tracing::info!(
                    %run_id,
                    epochs_run,
                    best_epoch,
                    "training finished, best val acc {:.2}%",
                    best_val_accuracy * 100.0
                );
            }
        }
    }
}
