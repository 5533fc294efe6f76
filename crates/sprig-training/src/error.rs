use thiserror::Error;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("invalid training config: {0}")]
    InvalidConfig(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    /// A batch produced a non-finite loss or gradient. The run is aborted.
    #[error("non-finite loss {loss} at epoch {epoch}, batch {batch}")]
    NumericInstability { epoch: u32, batch: usize, loss: f64 },

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
