//! The epoch-training control loop.
//!
//! `TrainingRun` owns all per-run state (history, best accuracy, early-stopping
//! counter), so independent runs never share anything. The model, loss,
//! optimizer and scheduler are borrowed for the duration of `train`.

use crate::checkpoint::{Checkpoint, CheckpointKind};
use crate::dataset::DataSource;
use crate::error::{TrainingError, TrainingResult};
use crate::job::{TrainingHyperParams, TrainingRunId};
use crate::layout::TrainingLayout;
use crate::loss::LossFn;
use crate::metrics::{EpochMetrics, TrainingHistory};
use crate::model::Model;
use crate::optim::{Optimizer, Scheduler};
use crate::progress::{ProgressEvent, ProgressSink, TracingProgressSink};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

pub struct TrainingRun {
    run_id: TrainingRunId,
    layout: TrainingLayout,
    class_labels: Vec<String>,
    max_epochs: u32,
    patience: u32,
    progress: Arc<dyn ProgressSink>,
    history: TrainingHistory,
    best_val_accuracy: f64,
    best_epoch: u32,
    epochs_without_improvement: u32,
    stopped_early: bool,
}

impl TrainingRun {
    /// `early_stopping_patience` is taken literally: the run stops once that many
    /// consecutive epochs fail to improve validation accuracy. With a patience of
    /// 0 it stops at the first epoch without improvement.
    pub fn new(
        layout: TrainingLayout,
        class_labels: Vec<String>,
        max_epochs: u32,
        early_stopping_patience: u32,
    ) -> TrainingResult<Self> {
        if max_epochs == 0 {
            return Err(TrainingError::InvalidConfig("max_epochs must be >= 1".to_string()));
        }
        if class_labels.is_empty() {
            return Err(TrainingError::InvalidConfig("class_labels must not be empty".to_string()));
        }
        Ok(Self {
            run_id: TrainingRunId::new(),
            layout,
            class_labels,
            max_epochs,
            patience: early_stopping_patience,
            progress: Arc::new(TracingProgressSink),
            history: TrainingHistory::new(),
            best_val_accuracy: 0.0,
            best_epoch: 0,
            epochs_without_improvement: 0,
            stopped_early: false,
        })
    }

    pub fn from_hyperparams(
        layout: TrainingLayout,
        class_labels: Vec<String>,
        params: &TrainingHyperParams,
    ) -> TrainingResult<Self> {
        params.validate()?;
        Self::new(layout, class_labels, params.epochs, params.early_stopping_patience)
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn run_id(&self) -> &TrainingRunId {
        &self.run_id
    }

    #[must_use]
    pub fn layout(&self) -> &TrainingLayout {
        &self.layout
    }

    #[must_use]
    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    #[must_use]
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    #[must_use]
    pub fn best_val_accuracy(&self) -> f64 {
        self.best_val_accuracy
    }

    /// 0 until some epoch beats the initial best accuracy of 0.
    #[must_use]
    pub fn best_epoch(&self) -> u32 {
        self.best_epoch
    }

    #[must_use]
    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    #[must_use]
    pub fn best_checkpoint_path(&self) -> PathBuf {
        self.layout.best_checkpoint_path()
    }

    /// Train for up to `max_epochs`, returning one history entry per completed epoch.
    ///
    /// A non-finite loss or gradient aborts the run. Checkpoint and history write
    /// failures are reported through the progress sink and do not stop training.
    pub fn train(
        &mut self,
        train_data: &dyn DataSource,
        val_data: &dyn DataSource,
        model: &mut dyn Model,
        loss_fn: &dyn LossFn,
        optimizer: &mut dyn Optimizer,
        mut scheduler: Option<&mut dyn Scheduler>,
    ) -> TrainingResult<TrainingHistory> {
        if train_data.is_empty() {
            return Err(TrainingError::Dataset("training data is empty".to_string()));
        }
        if val_data.is_empty() {
            return Err(TrainingError::Dataset("validation data is empty".to_string()));
        }
        self.layout.ensure_dirs()?;
        self.reset();

        self.progress.on_event(ProgressEvent::Started {
            run_id: self.run_id.clone(),
            max_epochs: self.max_epochs,
            train_samples: train_data.len(),
            val_samples: val_data.len(),
        });

        for epoch in 1..=self.max_epochs {
            let learning_rate = optimizer.learning_rate();

            model.set_training(true);
            let (train_loss, train_accuracy) = run_pass(epoch, train_data, model, loss_fn, Some(&mut *optimizer))?;

            model.set_training(false);
            let (val_loss, val_accuracy) = run_pass(epoch, val_data, model, loss_fn, None)?;

            if let Some(scheduler) = scheduler.as_mut() {
                scheduler.step(optimizer);
            }

            let metrics = EpochMetrics { epoch, train_loss, train_accuracy, val_loss, val_accuracy, learning_rate };
            self.history.push(metrics);

            let is_best = val_accuracy > self.best_val_accuracy;
            if is_best {
                self.best_val_accuracy = val_accuracy;
                self.best_epoch = epoch;
                self.epochs_without_improvement = 0;
            } else {
                self.epochs_without_improvement += 1;
            }

            self.save_checkpoints(epoch, val_accuracy, is_best, model, optimizer.learning_rate());
            self.progress.on_event(ProgressEvent::EpochCompleted { run_id: self.run_id.clone(), metrics, is_best });

            if self.epochs_without_improvement > 0 && self.epochs_without_improvement >= self.patience {
                if epoch < self.max_epochs {
                    self.stopped_early = true;
                    self.progress.on_event(ProgressEvent::EarlyStopped {
                        run_id: self.run_id.clone(),
                        epoch,
                        best_epoch: self.best_epoch,
                        best_val_accuracy: self.best_val_accuracy,
                    });
                }
                break;
            }
        }

        self.write_history();
        self.progress.on_event(ProgressEvent::Finished {
            run_id: self.run_id.clone(),
            epochs_run: self.history.len() as u32,
            best_epoch: self.best_epoch,
            best_val_accuracy: self.best_val_accuracy,
        });

        Ok(self.history.clone())
    }

    /// Metadata describing the best epoch, suitable for attaching to an uploaded model.
    #[must_use]
    pub fn summary_metadata(&self) -> BTreeMap<String, Value> {
        let mut out = BTreeMap::new();
        out.insert("total_epochs".to_string(), Value::from(self.history.len()));
        out.insert("num_classes".to_string(), Value::from(self.class_labels.len()));
        out.insert("class_labels".to_string(), Value::from(self.class_labels.join(",")));

        if let Some(best) = self.history.epoch(self.best_epoch) {
            out.insert("best_epoch".to_string(), Value::from(best.epoch));
            out.insert("train_accuracy".to_string(), Value::from(best.train_accuracy));
            out.insert("val_accuracy".to_string(), Value::from(best.val_accuracy));
            out.insert("train_loss".to_string(), Value::from(best.train_loss));
            out.insert("val_loss".to_string(), Value::from(best.val_loss));
        }
        if let Some(first) = self.history.epoch(1) {
            out.insert("initial_learning_rate".to_string(), Value::from(first.learning_rate));
        }
        out
    }

    fn reset(&mut self) {
        self.history = TrainingHistory::new();
        self.best_val_accuracy = 0.0;
        self.best_epoch = 0;
        self.epochs_without_improvement = 0;
        self.stopped_early = false;
    }

    fn save_checkpoints(&self, epoch: u32, val_accuracy: f64, is_best: bool, model: &dyn Model, learning_rate: f64) {
        let checkpoint = Checkpoint {
            epoch,
            val_accuracy,
            class_labels: self.class_labels.clone(),
            model_state: model.state(),
            learning_rate,
            history: self.history.clone(),
            saved_at: Utc::now(),
        };

        let mut targets = vec![(CheckpointKind::Latest, self.layout.latest_checkpoint_path())];
        if is_best {
            targets.push((CheckpointKind::Best, self.layout.best_checkpoint_path()));
        }

        for (kind, path) in targets {
            match checkpoint.save(&path) {
                Ok(()) => tracing::debug!(epoch, %kind, path = %path.display(), "checkpoint saved"),
                Err(e) => self.progress.on_event(ProgressEvent::CheckpointFailed {
                    run_id: self.run_id.clone(),
                    epoch,
                    kind,
                    message: e.to_string(),
                }),
            }
        }
    }

    fn write_history(&self) {
        let path = self.layout.history_path();
        let result = serde_json::to_vec_pretty(&self.history)
            .map_err(TrainingError::from)
            .and_then(|json| std::fs::write(&path, json).map_err(TrainingError::from));
        match result {
            Ok(()) => tracing::info!(path = %path.display(), "training history saved"),
            Err(e) => tracing::warn!(path = %path.display(), "failed to save training history: {e}"),
        }
    }
}

/// One full pass over `data`. With an optimizer the pass updates the model;
/// without one it only evaluates. Returns sample-weighted `(loss, accuracy)`.
fn run_pass(
    epoch: u32,
    data: &dyn DataSource,
    model: &mut dyn Model,
    loss_fn: &dyn LossFn,
    mut optimizer: Option<&mut dyn Optimizer>,
) -> TrainingResult<(f64, f64)> {
    let mut running_loss = 0.0f64;
    let mut correct = 0usize;
    let mut total = 0usize;

    for (index, batch) in data.batches().enumerate() {
        if batch.is_empty() {
            continue;
        }
        if let Some(opt) = optimizer.as_mut() {
            opt.zero_grad(&mut model.parameters_mut());
        }

        let logits = model.forward(batch.inputs());
        let out = loss_fn.compute(&logits, batch.labels());
        if !out.loss.is_finite() {
            return Err(TrainingError::NumericInstability { epoch, batch: index + 1, loss: f64::from(out.loss) });
        }

        if let Some(opt) = optimizer.as_mut() {
            model.backward(&out.grad);
            let mut params = model.parameters_mut();
            if params.iter().any(|p| !p.grad_is_finite()) {
                return Err(TrainingError::NumericInstability { epoch, batch: index + 1, loss: f64::from(out.loss) });
            }
            opt.step(&mut params);
        }

        let n = batch.len();
        running_loss += f64::from(out.loss) * n as f64;
        correct += (0..n).filter(|&r| logits.argmax_row(r) == batch.labels()[r]).count();
        total += n;
    }

    if total == 0 {
        return Err(TrainingError::Dataset(format!("epoch {epoch}: data source produced no samples")));
    }
    Ok((running_loss / total as f64, correct as f64 / total as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{InMemoryDataSource, Sample};
    use crate::loss::CrossEntropyLoss;
    use crate::model::{Backbone, ModelState, Parameter};
    use crate::optim::{Adam, Sgd};
    use crate::tensor::Matrix;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Reads the label from `features[0]`. In evaluation mode it gets the first
    /// `round(acc * n)` rows right, where `acc` is the next scripted accuracy.
    struct ScriptedModel {
        script: Vec<f64>,
        eval_epoch: usize,
        training: bool,
        weight: Parameter,
    }

    impl ScriptedModel {
        fn new(script: &[f64]) -> Self {
            Self { script: script.to_vec(), eval_epoch: 0, training: true, weight: Parameter::new("w", vec![0.0]) }
        }
    }

    impl Model for ScriptedModel {
        fn set_training(&mut self, training: bool) {
            if !training {
                self.eval_epoch += 1;
            }
            self.training = training;
        }

        fn forward(&mut self, inputs: &Matrix) -> Matrix {
            let n = inputs.rows();
            let right = if self.training {
                n
            } else {
                let acc = self.script[(self.eval_epoch - 1).min(self.script.len() - 1)];
                (acc * n as f64).round() as usize
            };
            let mut logits = Matrix::zeros(n, 2);
            for r in 0..n {
                let label = inputs.row(r)[0] as usize;
                let predicted = if r < right { label } else { 1 - label };
                logits.row_mut(r)[predicted] = 4.0;
            }
            logits
        }

        fn backward(&mut self, _grad_logits: &Matrix) {}

        fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
            vec![&mut self.weight]
        }

        fn state(&self) -> ModelState {
            ModelState { backbone: Backbone::Linear, input_dim: 1, num_classes: 2, tensors: BTreeMap::new() }
        }

        fn load_state(&mut self, _state: &ModelState) -> TrainingResult<()> {
            Ok(())
        }
    }

    struct NanModel(Parameter);

    impl Model for NanModel {
        fn set_training(&mut self, _training: bool) {}

        fn forward(&mut self, inputs: &Matrix) -> Matrix {
            Matrix::from_vec(inputs.rows(), 2, vec![f32::NAN; inputs.rows() * 2])
        }

        fn backward(&mut self, _grad_logits: &Matrix) {}

        fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
            vec![&mut self.0]
        }

        fn state(&self) -> ModelState {
            ModelState { backbone: Backbone::Linear, input_dim: 1, num_classes: 2, tensors: BTreeMap::new() }
        }

        fn load_state(&mut self, _state: &ModelState) -> TrainingResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<ProgressEvent>>);

    impl ProgressSink for RecordingSink {
        fn on_event(&self, event: ProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn labels() -> Vec<String> {
        vec!["grass".to_string(), "weed".to_string()]
    }

    fn alternating(n: usize, batch_size: usize) -> InMemoryDataSource {
        let samples = (0..n).map(|i| Sample { features: vec![(i % 2) as f32], label: i % 2 }).collect();
        InMemoryDataSource::new(samples, batch_size).unwrap()
    }

    fn scripted_run(temp: &TempDir, script: &[f64], max_epochs: u32, patience: u32) -> (TrainingRun, TrainingResult<TrainingHistory>) {
        let mut run = TrainingRun::new(TrainingLayout::new(temp.path().join("out")), labels(), max_epochs, patience).unwrap();
        let mut model = ScriptedModel::new(script);
        let mut opt = Sgd::new(0.1, 0.0, 0.0);
        let result = run.train(&alternating(40, 8), &alternating(100, 100), &mut model, &CrossEntropyLoss, &mut opt, None);
        (run, result)
    }

    #[test]
    fn test_stops_after_patience_stale_epochs() {
        let temp = TempDir::new().unwrap();
        let (run, result) = scripted_run(&temp, &[0.70, 0.75, 0.75, 0.73, 0.80], 5, 2);
        let history = result.unwrap();

        // epoch 3 ties the best and epoch 4 regresses: two stale epochs
        assert_eq!(history.len(), 4);
        assert_eq!(run.best_epoch(), 2);
        assert!((run.best_val_accuracy() - 0.75).abs() < 1e-12);
        assert!(run.stopped_early());

        let best = Checkpoint::load(&run.layout().best_checkpoint_path()).unwrap();
        assert_eq!(best.epoch, 2);
        assert_eq!(best.class_labels, labels());
        let latest = Checkpoint::load(&run.layout().latest_checkpoint_path()).unwrap();
        assert_eq!(latest.epoch, 4);
        assert_eq!(latest.history.len(), 4);

        let saved: TrainingHistory =
            serde_json::from_slice(&std::fs::read(run.layout().history_path()).unwrap()).unwrap();
        assert_eq!(saved, history);
    }

    #[test]
    fn test_pass_weights_ragged_batch_by_size() {
        // Batches of 3 then 2: the first all right, the second all wrong.
        let samples = (0..5).map(|i| Sample { features: vec![0.0], label: usize::from(i >= 3) }).collect();
        let data = InMemoryDataSource::new(samples, 3).unwrap();
        let mut model = ScriptedModel::new(&[1.0]);

        let (loss, acc) = run_pass(1, &data, &mut model, &CrossEntropyLoss, None).unwrap();

        // A mean over batches would give 0.5.
        assert!((acc - 0.6).abs() < 1e-12);
        let right = (1.0 + (-4.0f64).exp()).ln();
        let wrong = 4.0 + right;
        assert!((loss - (3.0 * right + 2.0 * wrong) / 5.0).abs() < 1e-4);
        assert!((loss - (right + wrong) / 2.0).abs() > 0.1);
    }

    #[test]
    fn test_large_patience_runs_every_epoch() {
        let temp = TempDir::new().unwrap();
        let (run, result) = scripted_run(&temp, &[0.70, 0.75, 0.75, 0.73, 0.80], 5, 10);
        let history = result.unwrap();

        assert_eq!(history.len(), 5);
        assert_eq!(run.best_epoch(), 5);
        assert!((run.best_val_accuracy() - 0.80).abs() < 1e-12);
        assert!(!run.stopped_early());
        for (i, m) in history.iter().enumerate() {
            assert_eq!(m.epoch as usize, i + 1);
        }
    }

    #[test]
    fn test_stop_on_final_epoch_is_not_early() {
        let temp = TempDir::new().unwrap();
        let (run, result) = scripted_run(&temp, &[0.8, 0.7], 2, 1);
        assert_eq!(result.unwrap().len(), 2);
        assert!(!run.stopped_early());
    }

    #[test]
    fn test_zero_patience_stops_on_first_stale_epoch() {
        let temp = TempDir::new().unwrap();
        let (run, result) = scripted_run(&temp, &[0.5, 0.4, 0.9], 3, 0);
        assert_eq!(result.unwrap().len(), 2);
        assert_eq!(run.best_epoch(), 1);
        assert!(run.stopped_early());
    }

    #[test]
    fn test_zero_accuracy_never_becomes_best() {
        let temp = TempDir::new().unwrap();
        let (run, result) = scripted_run(&temp, &[0.0, 0.0], 2, 5);
        assert_eq!(result.unwrap().len(), 2);
        assert_eq!(run.best_epoch(), 0);
        assert!(!run.layout().best_checkpoint_path().exists());
        assert!(run.layout().latest_checkpoint_path().exists());
    }

    #[test]
    fn test_non_finite_loss_aborts_run() {
        let temp = TempDir::new().unwrap();
        let mut run = TrainingRun::new(TrainingLayout::new(temp.path().to_path_buf()), labels(), 3, 2).unwrap();
        let mut model = NanModel(Parameter::new("w", vec![0.0]));
        let mut opt = Sgd::new(0.1, 0.0, 0.0);

        let err = run
            .train(&alternating(8, 4), &alternating(4, 4), &mut model, &CrossEntropyLoss, &mut opt, None)
            .unwrap_err();
        assert!(matches!(err, TrainingError::NumericInstability { epoch: 1, batch: 1, .. }));
        assert!(run.history().is_empty());
    }

    #[test]
    fn test_empty_validation_data_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut run = TrainingRun::new(TrainingLayout::new(temp.path().to_path_buf()), labels(), 3, 2).unwrap();
        let empty = InMemoryDataSource::new(Vec::new(), 4).unwrap();
        let mut model = ScriptedModel::new(&[0.5]);
        let mut opt = Sgd::new(0.1, 0.0, 0.0);

        let err = run.train(&alternating(8, 4), &empty, &mut model, &CrossEntropyLoss, &mut opt, None).unwrap_err();
        assert!(matches!(err, TrainingError::Dataset(_)));
    }

    #[test]
    fn test_checkpoint_write_failure_keeps_training() {
        let temp = TempDir::new().unwrap();
        let layout = TrainingLayout::new(temp.path().join("out"));
        layout.ensure_dirs().unwrap();
        // a directory in place of the best checkpoint makes the rename fail
        std::fs::create_dir_all(layout.best_checkpoint_path().join("blocker")).unwrap();

        let sink = Arc::new(RecordingSink::default());
        let mut run = TrainingRun::new(layout, labels(), 3, 5).unwrap().with_progress(sink.clone());
        let mut model = ScriptedModel::new(&[0.6, 0.7, 0.8]);
        let mut opt = Sgd::new(0.1, 0.0, 0.0);

        let history = run
            .train(&alternating(16, 8), &alternating(10, 10), &mut model, &CrossEntropyLoss, &mut opt, None)
            .unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(run.best_epoch(), 3);
        assert!(run.layout().latest_checkpoint_path().is_file());

        let events = sink.0.lock().unwrap();
        let failures = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::CheckpointFailed { kind: CheckpointKind::Best, .. }))
            .count();
        assert_eq!(failures, 3);
        assert!(matches!(events.last(), Some(ProgressEvent::Finished { epochs_run: 3, .. })));
    }

    #[test]
    fn test_scheduler_changes_recorded_learning_rate() {
        let temp = TempDir::new().unwrap();
        let mut run = TrainingRun::new(TrainingLayout::new(temp.path().to_path_buf()), labels(), 3, 5).unwrap();
        let mut model = ScriptedModel::new(&[0.6, 0.7, 0.8]);
        let mut opt = Sgd::new(0.1, 0.0, 0.0);
        let mut sched = crate::optim::StepLr::new(1, 0.5);

        let history = run
            .train(&alternating(8, 4), &alternating(10, 10), &mut model, &CrossEntropyLoss, &mut opt, Some(&mut sched))
            .unwrap();
        let lrs: Vec<f64> = history.iter().map(|m| m.learning_rate).collect();
        assert!((lrs[0] - 0.1).abs() < 1e-12);
        assert!((lrs[1] - 0.05).abs() < 1e-12);
        assert!((lrs[2] - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_accepts_boxed_optimizer_and_scheduler() {
        let temp = TempDir::new().unwrap();
        let mut run = TrainingRun::new(TrainingLayout::new(temp.path().to_path_buf()), labels(), 3, 5).unwrap();
        let mut model: Box<dyn Model> = Box::new(ScriptedModel::new(&[0.6, 0.7, 0.8]));
        let mut opt = crate::optim::OptimizerKind::Sgd.build(0.1, 0.0);
        let mut sched = crate::optim::SchedulerKind::Step.build(0.1, 3);

        let history = run
            .train(
                &alternating(8, 4),
                &alternating(10, 10),
                model.as_mut(),
                &CrossEntropyLoss,
                opt.as_mut(),
                sched.as_mut().map(|s| &mut **s as &mut dyn Scheduler),
            )
            .unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(run.best_epoch(), 3);
        assert!(history.iter().all(|m| (m.learning_rate - 0.1).abs() < 1e-12));
    }

    #[test]
    fn test_linear_model_learns_separable_data() {
        let temp = TempDir::new().unwrap();
        let samples: Vec<Sample> = (0..200)
            .map(|i| {
                let x0 = (i % 20) as f32 / 10.0 - 0.95;
                let x1 = ((i * 7) % 13) as f32 / 13.0 - 0.5;
                Sample { features: vec![x0, x1], label: usize::from(x0 > 0.0) }
            })
            .collect();
        let train = InMemoryDataSource::new(samples[..160].to_vec(), 16).unwrap();
        let val = InMemoryDataSource::new(samples[160..].to_vec(), 16).unwrap();

        let mut model = Backbone::Linear.build(2, 2, 3).unwrap();
        let mut opt = Adam::new(0.05, 0.0);
        let mut run = TrainingRun::new(TrainingLayout::new(temp.path().to_path_buf()), labels(), 30, 5).unwrap();
        run.train(&train, &val, model.as_mut(), &CrossEntropyLoss, &mut opt, None).unwrap();

        assert!(run.best_val_accuracy() >= 0.9, "best val acc {}", run.best_val_accuracy());
        let best = Checkpoint::load(&run.best_checkpoint_path()).unwrap();
        assert_eq!(best.epoch, run.best_epoch());

        let meta = run.summary_metadata();
        assert_eq!(meta["best_epoch"], Value::from(run.best_epoch()));
        assert_eq!(meta["num_classes"], Value::from(2));
        assert_eq!(meta["class_labels"], Value::from("grass,weed"));
    }

    #[test]
    fn test_from_hyperparams_validates() {
        let temp = TempDir::new().unwrap();
        let params = TrainingHyperParams { epochs: 0, ..TrainingHyperParams::default() };
        let err = TrainingRun::from_hyperparams(TrainingLayout::new(temp.path().to_path_buf()), labels(), &params);
        assert!(matches!(err, Err(TrainingError::InvalidConfig(_))));
    }
}
