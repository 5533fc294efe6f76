use crate::tensor::Matrix;

/// Mean loss over a batch and its gradient with respect to the logits.
#[derive(Debug, Clone)]
pub struct LossOutput {
    pub loss: f32,
    pub grad: Matrix,
}

pub trait LossFn: Send + Sync {
    fn compute(&self, logits: &Matrix, labels: &[usize]) -> LossOutput;
}

/// Softmax cross-entropy, averaged over the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyLoss;

impl LossFn for CrossEntropyLoss {
    fn compute(&self, logits: &Matrix, labels: &[usize]) -> LossOutput {
        let n = logits.rows();
        let mut grad = Matrix::zeros(n, logits.cols());
        if n == 0 {
            return LossOutput { loss: 0.0, grad };
        }

        let scale = 1.0 / n as f32;
        let mut total = 0.0f32;
        for (r, &label) in labels.iter().enumerate().take(n) {
            let row = logits.row(r);
            let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let sum_exp: f32 = row.iter().map(|v| (v - max).exp()).sum();
            let log_sum_exp = max + sum_exp.ln();

            // An out-of-range label poisons the loss rather than panicking.
            total += row.get(label).map_or(f32::NAN, |target| log_sum_exp - target);

            let g = grad.row_mut(r);
            for (c, (gv, v)) in g.iter_mut().zip(row).enumerate() {
                let p = (v - log_sum_exp).exp();
                *gv = (p - if c == label { 1.0 } else { 0.0 }) * scale;
            }
        }

        LossOutput { loss: total * scale, grad }
    }
}
