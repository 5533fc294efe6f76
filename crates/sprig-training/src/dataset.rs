use crate::error::{TrainingError, TrainingResult};
use crate::tensor::Matrix;
use serde::{Deserialize, Serialize};

/// A single preprocessed example: a feature vector and its class index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub features: Vec<f32>,
    pub label: usize,
}

/// A batch of samples packed into an input matrix (one row per sample).
#[derive(Debug, Clone)]
pub struct Batch {
    inputs: Matrix,
    labels: Vec<usize>,
}

impl Batch {
    #[must_use]
    pub fn new(inputs: Matrix, labels: Vec<usize>) -> Self {
        debug_assert_eq!(inputs.rows(), labels.len());
        Self { inputs, labels }
    }

    #[must_use]
    pub fn inputs(&self) -> &Matrix {
        &self.inputs
    }

    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A finite source of batches that restarts from the beginning on every call to `batches`.
pub trait DataSource: Send + Sync {
    /// Total number of samples per pass.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_>;
}

#[derive(Debug, Clone)]
pub struct InMemoryDataSource {
    samples: Vec<Sample>,
    feature_dim: usize,
    batch_size: usize,
}

impl InMemoryDataSource {
    pub fn new(samples: Vec<Sample>, batch_size: usize) -> TrainingResult<Self> {
        if batch_size == 0 {
            return Err(TrainingError::InvalidConfig("batch_size must be >= 1".to_string()));
        }
        let feature_dim = samples.first().map_or(0, |s| s.features.len());
        if let Some((idx, _)) = samples.iter().enumerate().find(|(_, s)| s.features.len() != feature_dim) {
            return Err(TrainingError::Dataset(format!(
                "sample[{idx}] has {} features, expected {feature_dim}",
                samples[idx].features.len()
            )));
        }
        Ok(Self { samples, feature_dim, batch_size })
    }

    #[must_use]
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl DataSource for InMemoryDataSource {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_> {
        let dim = self.feature_dim;
        Box::new(self.samples.chunks(self.batch_size).map(move |chunk| {
            let mut data = Vec::with_capacity(chunk.len() * dim);
            let mut labels = Vec::with_capacity(chunk.len());
            for sample in chunk {
                data.extend_from_slice(&sample.features);
                labels.push(sample.label);
            }
            Batch::new(Matrix::from_vec(chunk.len(), dim, data), labels)
        }))
    }
}
