//! Sprig Training
//!
//! Epoch-based classifier training with checkpointing and early stopping:
//! - Loading labeled datasets and splitting them into train/validation sources
//! - Building models, losses, optimizers and learning-rate schedules
//! - Running a `TrainingRun` that tracks the best epoch and writes checkpoints

pub mod builders;
pub mod checkpoint;
pub mod dataset;
pub mod error;
pub mod job;
pub mod layout;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod optim;
pub mod progress;
pub mod tensor;
pub mod trainer;

pub use builders::{write_jsonl_records, LabeledDataset, LabeledRecord};
pub use checkpoint::{Checkpoint, CheckpointKind};
pub use dataset::{Batch, DataSource, InMemoryDataSource, Sample};
pub use error::{TrainingError, TrainingResult};
pub use job::{TrainingHyperParams, TrainingRunId};
pub use layout::TrainingLayout;
pub use loss::{CrossEntropyLoss, LossFn, LossOutput};
pub use metrics::{EpochMetrics, TrainingHistory};
pub use model::{Backbone, Model, ModelState, Parameter};
pub use optim::{Adam, CosineAnnealingLr, Optimizer, OptimizerKind, Scheduler, SchedulerKind, Sgd, StepLr};
pub use progress::{ProgressEvent, ProgressSink, TracingProgressSink};
pub use tensor::Matrix;
pub use trainer::TrainingRun;
