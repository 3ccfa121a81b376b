use serde::{Deserialize, Serialize};

/// Dense row-major matrix of probabilities. Element `[i][j]` lives at
/// `cols * i + j`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns 0 outside the matrix.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i < self.rows && j < self.cols {
            self.data[self.cols * i + j]
        } else {
            0.0
        }
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[self.cols * i + j] = value;
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[self.cols * i..self.cols * (i + 1)]
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.data.len() == self.rows * self.cols
    }
}
