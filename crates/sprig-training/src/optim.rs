//! Optimizers and learning-rate schedulers.
//!
//! Optimizers receive the model's parameters on every call instead of holding
//! references to them, so the model stays exclusively owned by the training loop.

use crate::error::TrainingError;
use crate::model::Parameter;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

pub trait Optimizer: Send {
    fn zero_grad(&mut self, params: &mut [&mut Parameter]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    fn step(&mut self, params: &mut [&mut Parameter]);

    fn learning_rate(&self) -> f64;

    fn set_learning_rate(&mut self, lr: f64);
}

/// SGD with momentum and L2 weight decay.
#[derive(Debug, Clone)]
pub struct Sgd {
    lr: f64,
    momentum: f32,
    weight_decay: f32,
    velocity: Vec<Vec<f32>>,
}

impl Sgd {
    #[must_use]
    pub fn new(lr: f64, momentum: f32, weight_decay: f32) -> Self {
        Self { lr, momentum, weight_decay, velocity: Vec::new() }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        if self.velocity.len() != params.len() {
            self.velocity = params.iter().map(|p| vec![0.0; p.value.len()]).collect();
        }
        let lr = self.lr as f32;
        for (param, velocity) in params.iter_mut().zip(&mut self.velocity) {
            let Parameter { value, grad, .. } = &mut **param;
            for ((w, g), v) in value.iter_mut().zip(grad.iter()).zip(velocity.iter_mut()) {
                let g = g + self.weight_decay * *w;
                *v = self.momentum * *v + g;
                *w -= lr * *v;
            }
        }
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.lr = lr;
    }
}

/// Adam, with either L2 (`Adam`) or decoupled (`AdamW`) weight decay.
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f64,
    beta1: f32,
    beta2: f32,
    eps: f32,
    weight_decay: f32,
    decoupled: bool,
    step: i32,
    m: Vec<Vec<f32>>,
    v: Vec<Vec<f32>>,
}

impl Adam {
    #[must_use]
    pub fn new(lr: f64, weight_decay: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            weight_decay,
            decoupled: false,
            step: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    #[must_use]
    pub fn adamw(lr: f64, weight_decay: f32) -> Self {
        Self { decoupled: true, ..Self::new(lr, weight_decay) }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        if self.m.len() != params.len() {
            self.m = params.iter().map(|p| vec![0.0; p.value.len()]).collect();
            self.v = self.m.clone();
            self.step = 0;
        }
        self.step += 1;
        let lr = self.lr as f32;
        let bias1 = 1.0 - self.beta1.powi(self.step);
        let bias2 = 1.0 - self.beta2.powi(self.step);

        for ((param, m), v) in params.iter_mut().zip(&mut self.m).zip(&mut self.v) {
            let Parameter { value, grad, .. } = &mut **param;
            for (i, w) in value.iter_mut().enumerate() {
                let mut g = grad[i];
                if self.decoupled {
                    *w -= lr * self.weight_decay * *w;
                } else {
                    g += self.weight_decay * *w;
                }
                m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * g;
                v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * g * g;
                let m_hat = m[i] / bias1;
                let v_hat = v[i] / bias2;
                *w -= lr * m_hat / (v_hat.sqrt() + self.eps);
            }
        }
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.lr = lr;
    }
}

/// Advanced once per epoch, after validation.
pub trait Scheduler: Send {
    fn step(&mut self, optimizer: &mut dyn Optimizer);
}

/// Multiply the learning rate by `gamma` every `step_size` epochs.
#[derive(Debug, Clone)]
pub struct StepLr {
    step_size: u32,
    gamma: f64,
    epoch: u32,
}

impl StepLr {
    #[must_use]
    pub fn new(step_size: u32, gamma: f64) -> Self {
        Self { step_size: step_size.max(1), gamma, epoch: 0 }
    }
}

impl Scheduler for StepLr {
    fn step(&mut self, optimizer: &mut dyn Optimizer) {
        self.epoch += 1;
        if self.epoch % self.step_size == 0 {
            optimizer.set_learning_rate(optimizer.learning_rate() * self.gamma);
        }
    }
}

/// `lr_t = lr_min + (lr_max - lr_min) * (1 + cos(pi * t / t_max)) / 2`
#[derive(Debug, Clone)]
pub struct CosineAnnealingLr {
    lr_max: f64,
    lr_min: f64,
    t_max: u32,
    epoch: u32,
}

impl CosineAnnealingLr {
    #[must_use]
    pub fn new(lr_max: f64, t_max: u32, lr_min: f64) -> Self {
        Self { lr_max, lr_min, t_max: t_max.max(1), epoch: 0 }
    }
}

impl Scheduler for CosineAnnealingLr {
    fn step(&mut self, optimizer: &mut dyn Optimizer) {
        self.epoch = (self.epoch + 1).min(self.t_max);
        let progress = f64::from(self.epoch) / f64::from(self.t_max);
        let lr = self.lr_min + (self.lr_max - self.lr_min) * (1.0 + (PI * progress).cos()) / 2.0;
        optimizer.set_learning_rate(lr);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Adam,
    #[default]
    AdamW,
    Sgd,
}

impl OptimizerKind {
    #[must_use]
    pub fn build(self, lr: f64, weight_decay: f64) -> Box<dyn Optimizer> {
        let wd = weight_decay as f32;
        match self {
            Self::Adam => Box::new(Adam::new(lr, wd)),
            Self::AdamW => Box::new(Adam::adamw(lr, wd)),
            Self::Sgd => Box::new(Sgd::new(lr, 0.9, wd)),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Adam => "adam",
            Self::AdamW => "adamw",
            Self::Sgd => "sgd",
        })
    }
}

impl FromStr for OptimizerKind {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adam" => Ok(Self::Adam),
            "adamw" => Ok(Self::AdamW),
            "sgd" => Ok(Self::Sgd),
            other => Err(TrainingError::InvalidConfig(format!("unsupported optimizer: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    #[default]
    Cosine,
    Step,
    None,
}

impl SchedulerKind {
    #[must_use]
    pub fn build(self, base_lr: f64, epochs: u32) -> Option<Box<dyn Scheduler>> {
        match self {
            Self::Cosine => Some(Box::new(CosineAnnealingLr::new(base_lr, epochs, 0.0))),
            Self::Step => Some(Box::new(StepLr::new(10, 0.1))),
            Self::None => None,
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cosine => "cosine",
            Self::Step => "step",
            Self::None => "none",
        })
    }
}

impl FromStr for SchedulerKind {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "step" => Ok(Self::Step),
            "none" => Ok(Self::None),
            other => Err(TrainingError::InvalidConfig(format!("unsupported scheduler: {other}"))),
        }
    }
}
