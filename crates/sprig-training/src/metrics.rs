use serde::{Deserialize, Serialize};

/// Metrics for one completed epoch. Losses and accuracies are sample-weighted averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: u32,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
    /// Learning rate in effect while the epoch ran.
    pub learning_rate: f64,
}

/// Append-only record of a run, one entry per completed epoch in epoch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingHistory {
    epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, metrics: EpochMetrics) {
        debug_assert_eq!(metrics.epoch as usize, self.epochs.len() + 1);
        self.epochs.push(metrics);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpochMetrics> {
        self.epochs.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[EpochMetrics] {
        &self.epochs
    }

    /// Metrics for a 1-based epoch number.
    #[must_use]
    pub fn epoch(&self, epoch: u32) -> Option<&EpochMetrics> {
        self.epochs.get((epoch as usize).checked_sub(1)?)
    }

    #[must_use]
    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}

impl<'a> IntoIterator for &'a TrainingHistory {
    type Item = &'a EpochMetrics;
    type IntoIter = std::slice::Iter<'a, EpochMetrics>;

    fn into_iter(self) -> Self::IntoIter {
        self.epochs.iter()
    }
}
