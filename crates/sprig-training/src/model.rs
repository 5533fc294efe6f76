//! Classifier models and the backbone selection they are built from.
//!
//! A `Backbone` is chosen once (usually parsed from configuration) and
//! `Backbone::build` returns the matching `Model` implementation. The training
//! loop only ever talks to `dyn Model`.

use crate::error::{TrainingError, TrainingResult};
use crate::tensor::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const DEFAULT_MLP_HIDDEN: usize = 64;

/// A trainable tensor and its accumulated gradient.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub value: Vec<f32>,
    pub grad: Vec<f32>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: Vec<f32>) -> Self {
        let grad = vec![0.0; value.len()];
        Self { name: name.into(), value, grad }
    }

    pub fn zero_grad(&mut self) {
        self.grad.iter_mut().for_each(|g| *g = 0.0);
    }

    #[must_use]
    pub fn grad_is_finite(&self) -> bool {
        self.grad.iter().all(|g| g.is_finite())
    }
}

/// Serializable snapshot of a model's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub backbone: Backbone,
    pub input_dim: usize,
    pub num_classes: usize,
    pub tensors: BTreeMap<String, Vec<f32>>,
}

pub trait Model: Send {
    /// Switch between training (activations cached for `backward`) and evaluation mode.
    fn set_training(&mut self, training: bool);

    /// Compute logits, one row per input row and one column per class.
    fn forward(&mut self, inputs: &Matrix) -> Matrix;

    /// Accumulate parameter gradients from dLoss/dLogits of the last `forward` in training mode.
    fn backward(&mut self, grad_logits: &Matrix);

    fn parameters_mut(&mut self) -> Vec<&mut Parameter>;

    fn state(&self) -> ModelState;

    fn load_state(&mut self, state: &ModelState) -> TrainingResult<()>;
}

/// The classifier architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backbone {
    /// Softmax regression over the input features.
    Linear,
    /// One ReLU hidden layer followed by a linear head.
    Mlp { hidden: usize },
}

impl Default for Backbone {
    fn default() -> Self {
        Self::Linear
    }
}

impl fmt::Display for Backbone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Mlp { hidden } => write!(f, "mlp:{hidden}"),
        }
    }
}

impl FromStr for Backbone {
    type Err = TrainingError;

    /// Accepts `linear`, `mlp` and `mlp:<hidden>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.split_once(':') {
            None if s == "linear" => Ok(Self::Linear),
            None if s == "mlp" => Ok(Self::Mlp { hidden: DEFAULT_MLP_HIDDEN }),
            Some(("mlp", hidden)) => {
                let hidden: usize = hidden
                    .parse()
                    .map_err(|_| TrainingError::InvalidConfig(format!("invalid mlp hidden size: {hidden}")))?;
                if hidden == 0 {
                    return Err(TrainingError::InvalidConfig("mlp hidden size must be >= 1".to_string()));
                }
                Ok(Self::Mlp { hidden })
            }
            _ => Err(TrainingError::InvalidConfig(format!("unsupported backbone: {s}"))),
        }
    }
}

impl Backbone {
    pub fn build(&self, input_dim: usize, num_classes: usize, seed: u64) -> TrainingResult<Box<dyn Model>> {
        if input_dim == 0 {
            return Err(TrainingError::InvalidConfig("input_dim must be >= 1".to_string()));
        }
        if num_classes < 2 {
            return Err(TrainingError::InvalidConfig(format!("need at least 2 classes, got {num_classes}")));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        Ok(match *self {
            Self::Linear => Box::new(LinearClassifier {
                head: Dense::new("head", input_dim, num_classes, &mut rng),
                training: false,
            }),
            Self::Mlp { hidden } => Box::new(MlpClassifier {
                hidden: Dense::new("hidden", input_dim, hidden, &mut rng),
                head: Dense::new("head", hidden, num_classes, &mut rng),
                pre_activation: None,
                training: false,
            }),
        })
    }
}

/// Fully connected layer, weights stored `[in, out]` row-major.
#[derive(Debug, Clone)]
struct Dense {
    weight: Parameter,
    bias: Parameter,
    in_dim: usize,
    out_dim: usize,
    input: Option<Matrix>,
}

impl Dense {
    fn new(name: &str, in_dim: usize, out_dim: usize, rng: &mut StdRng) -> Self {
        // Xavier-uniform
        let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let weight = (0..in_dim * out_dim).map(|_| rng.gen_range(-limit..limit)).collect();
        Self {
            weight: Parameter::new(format!("{name}.weight"), weight),
            bias: Parameter::new(format!("{name}.bias"), vec![0.0; out_dim]),
            in_dim,
            out_dim,
            input: None,
        }
    }

    fn forward(&mut self, inputs: &Matrix, training: bool) -> Matrix {
        self.input = training.then(|| inputs.clone());
        inputs.affine(&self.weight.value, &self.bias.value)
    }

    /// Accumulates dW/db and returns dLoss/dInput.
    fn backward(&mut self, grad_out: &Matrix) -> Option<Matrix> {
        let input = self.input.as_ref()?;
        let mut grad_in = Matrix::zeros(input.rows(), self.in_dim);

        for r in 0..input.rows() {
            let x = input.row(r);
            let g = grad_out.row(r);
            for (o, go) in g.iter().enumerate() {
                self.bias.grad[o] += go;
            }
            let gi = grad_in.row_mut(r);
            for i in 0..self.in_dim {
                let w_row = &self.weight.value[i * self.out_dim..(i + 1) * self.out_dim];
                let gw_row = &mut self.weight.grad[i * self.out_dim..(i + 1) * self.out_dim];
                let mut acc = 0.0;
                for o in 0..self.out_dim {
                    gw_row[o] += x[i] * g[o];
                    acc += g[o] * w_row[o];
                }
                gi[i] = acc;
            }
        }
        Some(grad_in)
    }

    fn export(&self, tensors: &mut BTreeMap<String, Vec<f32>>) {
        tensors.insert(self.weight.name.clone(), self.weight.value.clone());
        tensors.insert(self.bias.name.clone(), self.bias.value.clone());
    }

    fn import(&mut self, tensors: &BTreeMap<String, Vec<f32>>) -> TrainingResult<()> {
        for param in [&mut self.weight, &mut self.bias] {
            let values = tensors
                .get(&param.name)
                .ok_or_else(|| TrainingError::Checkpoint(format!("missing tensor {}", param.name)))?;
            if values.len() != param.value.len() {
                return Err(TrainingError::Checkpoint(format!(
                    "tensor {} has {} values, expected {}",
                    param.name,
                    values.len(),
                    param.value.len()
                )));
            }
            param.value.copy_from_slice(values);
            param.zero_grad();
        }
        Ok(())
    }
}

fn check_state(state: &ModelState, backbone: Backbone, input_dim: usize, num_classes: usize) -> TrainingResult<()> {
    if state.backbone != backbone || state.input_dim != input_dim || state.num_classes != num_classes {
        return Err(TrainingError::Checkpoint(format!(
            "checkpoint is {} ({} -> {}), model is {} ({} -> {})",
            state.backbone, state.input_dim, state.num_classes, backbone, input_dim, num_classes
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct LinearClassifier {
    head: Dense,
    training: bool,
}

impl Model for LinearClassifier {
    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn forward(&mut self, inputs: &Matrix) -> Matrix {
        self.head.forward(inputs, self.training)
    }

    fn backward(&mut self, grad_logits: &Matrix) {
        let _ = self.head.backward(grad_logits);
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.head.weight, &mut self.head.bias]
    }

    fn state(&self) -> ModelState {
        let mut tensors = BTreeMap::new();
        self.head.export(&mut tensors);
        ModelState {
            backbone: Backbone::Linear,
            input_dim: self.head.in_dim,
            num_classes: self.head.out_dim,
            tensors,
        }
    }

    fn load_state(&mut self, state: &ModelState) -> TrainingResult<()> {
        check_state(state, Backbone::Linear, self.head.in_dim, self.head.out_dim)?;
        self.head.import(&state.tensors)
    }
}

#[derive(Debug, Clone)]
pub struct MlpClassifier {
    hidden: Dense,
    head: Dense,
    pre_activation: Option<Matrix>,
    training: bool,
}

impl Model for MlpClassifier {
    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn forward(&mut self, inputs: &Matrix) -> Matrix {
        let pre = self.hidden.forward(inputs, self.training);
        let mut activated = pre.clone();
        activated.map_inplace(|v| v.max(0.0));
        self.pre_activation = self.training.then_some(pre);
        self.head.forward(&activated, self.training)
    }

    fn backward(&mut self, grad_logits: &Matrix) {
        let Some(mut grad_hidden) = self.head.backward(grad_logits) else {
            return;
        };
        let Some(pre) = self.pre_activation.as_ref() else {
            return;
        };
        for r in 0..pre.rows() {
            let mask = pre.row(r);
            for (g, p) in grad_hidden.row_mut(r).iter_mut().zip(mask) {
                if *p <= 0.0 {
                    *g = 0.0;
                }
            }
        }
        let _ = self.hidden.backward(&grad_hidden);
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.hidden.weight, &mut self.hidden.bias, &mut self.head.weight, &mut self.head.bias]
    }

    fn state(&self) -> ModelState {
        let mut tensors = BTreeMap::new();
        self.hidden.export(&mut tensors);
        self.head.export(&mut tensors);
        ModelState {
            backbone: Backbone::Mlp { hidden: self.hidden.out_dim },
            input_dim: self.hidden.in_dim,
            num_classes: self.head.out_dim,
            tensors,
        }
    }

    fn load_state(&mut self, state: &ModelState) -> TrainingResult<()> {
        check_state(
            state,
            Backbone::Mlp { hidden: self.hidden.out_dim },
            self.hidden.in_dim,
            self.head.out_dim,
        )?;
        self.hidden.import(&state.tensors)?;
        self.head.import(&state.tensors)
    }
}
