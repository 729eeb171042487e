//! Feature standardization: `(x - mean) / std` per column.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Columns whose spread falls below this keep a unit scale (centered only).
const MIN_SCALE: f64 = 1e-10;

/// Fitted per-column mean and scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on the rows of `x`, using the sample standard deviation (n - 1).
    pub fn fit(x: &DMatrix<f64>) -> Result<Self, AppError> {
        let mut moments = ColumnMoments::new(x.ncols());
        for row in x.row_iter() {
            moments.push(row.iter().copied());
        }
        Self::from_moments(&moments)
    }

    /// Build a scaler from (possibly merged) column moments.
    pub fn from_moments(moments: &ColumnMoments) -> Result<Self, AppError> {
        if moments.n == 0 {
            return Err(AppError::InsufficientData {
                stage: "feature standardization",
                rows: 0,
                needed: 1,
            });
        }
        let scale = moments
            .m2
            .iter()
            .map(|m2| {
                let std = if moments.n > 1 {
                    (m2 / (moments.n - 1) as f64).sqrt()
                } else {
                    0.0
                };
                if std < MIN_SCALE { 1.0 } else { std }
            })
            .collect();
        Ok(Self {
            mean: moments.mean.clone(),
            scale,
        })
    }

    pub fn transform_value(&self, column: usize, value: f64) -> f64 {
        (value - self.mean[column]) / self.scale[column]
    }

    pub fn transform(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| self.transform_value(j, x[(i, j)]))
    }
}

/// Running per-column count, mean and sum of squared deviations.
///
/// Partial moments from disjoint row sets merge exactly, so partitions can be
/// summarized independently and combined afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMoments {
    pub n: usize,
    pub mean: Vec<f64>,
    pub m2: Vec<f64>,
}

impl ColumnMoments {
    pub fn new(n_cols: usize) -> Self {
        Self {
            n: 0,
            mean: vec![0.0; n_cols],
            m2: vec![0.0; n_cols],
        }
    }

    pub fn push(&mut self, row: impl IntoIterator<Item = f64>) {
        self.n += 1;
        let n = self.n as f64;
        for (j, x) in row.into_iter().enumerate() {
            let delta = x - self.mean[j];
            self.mean[j] += delta / n;
            self.m2[j] += delta * (x - self.mean[j]);
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        if other.n == 0 {
            return self;
        }
        if self.n == 0 {
            return other;
        }
        let (na, nb) = (self.n as f64, other.n as f64);
        let n = na + nb;
        for j in 0..self.mean.len() {
            let delta = other.mean[j] - self.mean[j];
            self.mean[j] += delta * nb / n;
            self.m2[j] += other.m2[j] + delta * delta * na * nb / n;
        }
        self.n += other.n;
        self
    }
}
