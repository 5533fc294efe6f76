use crate::dataset::{InMemoryDataSource, Sample};
use crate::error::{TrainingError, TrainingResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// One line of a JSONL feature file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub features: Vec<f32>,
    pub label: String,
}

/// A labeled dataset with a stable class-label ordering.
///
/// Class labels are sorted, so the index-to-label mapping does not depend on
/// the order records appear in the input.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    class_labels: Vec<String>,
    samples: Vec<Sample>,
    feature_dim: usize,
}

impl LabeledDataset {
    pub fn from_records(records: Vec<LabeledRecord>) -> TrainingResult<Self> {
        if records.is_empty() {
            return Err(TrainingError::Dataset("dataset must not be empty".to_string()));
        }

        let class_labels: Vec<String> =
            records.iter().map(|r| r.label.clone()).collect::<BTreeSet<_>>().into_iter().collect();
        let index: HashMap<&str, usize> =
            class_labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();

        let feature_dim = records[0].features.len();
        if feature_dim == 0 {
            return Err(TrainingError::Dataset("record[0] has no features".to_string()));
        }

        let mut samples = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if record.features.len() != feature_dim {
                return Err(TrainingError::Dataset(format!(
                    "record[{idx}] has {} features, expected {feature_dim}",
                    record.features.len()
                )));
            }
            if record.features.iter().any(|f| !f.is_finite()) {
                return Err(TrainingError::Dataset(format!("record[{idx}] has non-finite features")));
            }
            samples.push(Sample { features: record.features.clone(), label: index[record.label.as_str()] });
        }

        Ok(Self { class_labels, samples, feature_dim })
    }

    pub fn read_jsonl(path: &Path) -> TrainingResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut records = Vec::new();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: LabeledRecord = serde_json::from_str(line).map_err(|e| {
                TrainingError::Dataset(format!("failed to parse jsonl line {}: {}", idx + 1, e))
            })?;
            records.push(record);
        }

        Self::from_records(records)
    }

    #[must_use]
    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    #[must_use]
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Shuffle with `seed` and split into `(train, validation)` sources.
    ///
    /// Both sides always receive at least one sample.
    pub fn split(
        &self,
        validation_split: f64,
        seed: u64,
        batch_size: usize,
    ) -> TrainingResult<(InMemoryDataSource, InMemoryDataSource)> {
        if !(validation_split > 0.0 && validation_split < 1.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "validation_split must be in (0, 1), got {validation_split}"
            )));
        }
        let n = self.samples.len();
        if n < 2 {
            return Err(TrainingError::Dataset(format!("need at least 2 samples to split, got {n}")));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));

        let val_count = ((n as f64) * validation_split).round() as usize;
        let val_count = val_count.clamp(1, n - 1);

        let pick = |ids: &[usize]| ids.iter().map(|&i| self.samples[i].clone()).collect::<Vec<_>>();
        let val = InMemoryDataSource::new(pick(&indices[..val_count]), batch_size)?;
        let train = InMemoryDataSource::new(pick(&indices[val_count..]), batch_size)?;
        Ok((train, val))
    }
}

pub fn write_jsonl_records(path: &Path, records: &[LabeledRecord]) -> TrainingResult<()> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}
