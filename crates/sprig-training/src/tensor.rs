//! Dense row-major matrix used for batches, logits and gradients.

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Build a matrix from row-major data.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    #[must_use]
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), rows * cols, "matrix data does not match shape {rows}x{cols}");
        Self { rows, cols, data }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.data[index * self.cols..(index + 1) * self.cols]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Index of the largest value in a row. Ties resolve to the lowest index.
    #[must_use]
    pub fn argmax_row(&self, index: usize) -> usize {
        let mut best = 0;
        let row = self.row(index);
        for (i, value) in row.iter().enumerate().skip(1) {
            if *value > row[best] {
                best = i;
            }
        }
        best
    }

    /// `self (rows x in) * weights (in x out) + bias (out)`.
    #[must_use]
    pub fn affine(&self, weights: &[f32], bias: &[f32]) -> Self {
        let out_dim = bias.len();
        debug_assert_eq!(weights.len(), self.cols * out_dim);

        let mut out = Self::zeros(self.rows, out_dim);
        for r in 0..self.rows {
            let input = self.row(r);
            let output = out.row_mut(r);
            output.copy_from_slice(bias);
            for (i, x) in input.iter().enumerate() {
                if *x == 0.0 {
                    continue;
                }
                let w_row = &weights[i * out_dim..(i + 1) * out_dim];
                for (o, w) in output.iter_mut().zip(w_row) {
                    *o += x * w;
                }
            }
        }
        out
    }

    pub fn map_inplace(&mut self, f: impl Fn(f32) -> f32) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_matches_manual_product() {
        let x = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        // weights 2x3
        let w = vec![1.0, 0.0, -1.0, 0.5, 1.0, 2.0];
        let b = vec![0.1, 0.2, 0.3];

        let y = x.affine(&w, &b);
        assert_eq!(y.rows(), 2);
        assert_eq!(y.cols(), 3);
        assert!((y.row(0)[0] - 2.1).abs() < 1e-6);
        assert!((y.row(0)[2] - 3.3).abs() < 1e-6);
        assert!((y.row(1)[1] - 4.2).abs() < 1e-6);
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        let m = Matrix::from_vec(1, 3, vec![0.5, 0.5, 0.1]);
        assert_eq!(m.argmax_row(0), 0);
    }
}
