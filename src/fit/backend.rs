//! Least-squares backends behind one interface.
//!
//! - `LocalBackend`: sequential; one SVD over the full design matrix.
//! - `ParallelBackend`: staged assemble → moments → regress over row
//!   partitions. Each partition reduces its rows to column moments and a
//!   partial centered Gram matrix on the rayon pool; only those small
//!   summaries are combined and solved.
//!
//! Both apply the same standardization policy, so they agree on predictions.

use std::ops::Range;

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::BackendKind;
use crate::error::AppError;
use crate::fit::scaler::{ColumnMoments, StandardScaler};
use crate::math::{solve_least_squares, solve_normal_equations, with_intercept};

/// Parameters produced by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Present when the weights apply to standardized features.
    pub scaler: Option<StandardScaler>,
}

impl LinearFit {
    fn from_beta(beta: &DVector<f64>, scaler: Option<StandardScaler>) -> Self {
        Self {
            intercept: beta[0],
            weights: beta.iter().skip(1).copied().collect(),
            scaler,
        }
    }
}

/// `fit(features, target) -> weights, intercept`.
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn fit(&self, x: &DMatrix<f64>, y: &DVector<f64>, standardize: bool) -> Result<LinearFit, AppError>;
}

/// Build the backend selected by configuration.
pub fn backend_for(kind: BackendKind, partitions: Option<usize>) -> Box<dyn Backend> {
    match kind {
        BackendKind::Local => Box::new(LocalBackend),
        BackendKind::Parallel => Box::new(ParallelBackend::new(
            partitions.unwrap_or_else(rayon::current_num_threads),
        )),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl Backend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn fit(&self, x: &DMatrix<f64>, y: &DVector<f64>, standardize: bool) -> Result<LinearFit, AppError> {
        check_shapes(x, y)?;

        let scaler = if standardize {
            Some(StandardScaler::fit(x)?)
        } else {
            None
        };
        let design = match &scaler {
            Some(s) => with_intercept(&s.transform(x)),
            None => with_intercept(x),
        };

        let beta = solve_least_squares(&design, y)
            .ok_or_else(|| AppError::Numeric("least squares solve failed (ill-conditioned design)".to_string()))?;
        Ok(LinearFit::from_beta(&beta, scaler))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParallelBackend {
    partitions: usize,
}

impl ParallelBackend {
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
        }
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Stage 1: contiguous row ranges, one per partition.
    fn assemble(&self, n_rows: usize) -> Vec<Range<usize>> {
        let chunk = n_rows.div_ceil(self.partitions).max(1);
        (0..n_rows)
            .step_by(chunk)
            .map(|start| start..(start + chunk).min(n_rows))
            .collect()
    }

    /// Stage 2: per-partition moments of `[x | y]`, merged.
    ///
    /// Always computed: the regression runs on centered columns, and the same
    /// moments give the scaler when standardizing.
    fn moments(&self, x: &DMatrix<f64>, y: &DVector<f64>, parts: &[Range<usize>]) -> (ColumnMoments, f64) {
        let p = x.ncols();
        let joint = parts
            .par_iter()
            .map(|range| {
                let mut m = ColumnMoments::new(p + 1);
                for i in range.clone() {
                    m.push(x.row(i).iter().copied().chain(std::iter::once(y[i])));
                }
                m
            })
            .reduce(|| ColumnMoments::new(p + 1), ColumnMoments::merge);

        let y_mean = joint.mean[p];
        let x_moments = ColumnMoments {
            n: joint.n,
            mean: joint.mean[..p].to_vec(),
            m2: joint.m2[..p].to_vec(),
        };
        (x_moments, y_mean)
    }

    /// Stage 3: per-partition `ZᵀZ` and `Zᵀ(y - ȳ)` with `Z = (x - x̄) / scale`,
    /// summed and solved for the slope weights.
    fn regress(
        &self,
        x: &DMatrix<f64>,
        y: &DVector<f64>,
        parts: &[Range<usize>],
        center: &[f64],
        scale: &[f64],
        y_mean: f64,
    ) -> Result<DVector<f64>, AppError> {
        let p = x.ncols();
        let zero = move || (DMatrix::<f64>::zeros(p, p), DVector::<f64>::zeros(p));

        let (gram, zty) = parts
            .par_iter()
            .map(|range| {
                let (mut gram, mut zty) = zero();
                let mut z = DVector::<f64>::zeros(p);
                for i in range.clone() {
                    for j in 0..p {
                        z[j] = (x[(i, j)] - center[j]) / scale[j];
                    }
                    gram.ger(1.0, &z, &z, 1.0);
                    zty.axpy(y[i] - y_mean, &z, 1.0);
                }
                (gram, zty)
            })
            .reduce(zero, |(ga, va), (gb, vb)| (ga + gb, va + vb));

        solve_normal_equations(&gram, &zty)
            .ok_or_else(|| AppError::Numeric("normal equations solve failed (singular Gram matrix)".to_string()))
    }
}

impl Backend for ParallelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Parallel
    }

    fn fit(&self, x: &DMatrix<f64>, y: &DVector<f64>, standardize: bool) -> Result<LinearFit, AppError> {
        check_shapes(x, y)?;

        let parts = self.assemble(x.nrows());
        tracing::debug!(partitions = parts.len(), rows = x.nrows(), "assembled partitions");

        let (moments, y_mean) = self.moments(x, y, &parts);
        let scaler = if standardize {
            Some(StandardScaler::from_moments(&moments)?)
        } else {
            None
        };
        let scale = match &scaler {
            Some(s) => s.scale.clone(),
            None => vec![1.0; x.ncols()],
        };
        let w = self.regress(x, y, &parts, &moments.mean, &scale, y_mean)?;

        // Centered scaled features have zero mean, so the intercept there is ȳ.
        let intercept = match scaler {
            Some(_) => y_mean,
            None => y_mean - w.iter().zip(&moments.mean).map(|(w, m)| w * m).sum::<f64>(),
        };
        Ok(LinearFit {
            weights: w.iter().copied().collect(),
            intercept,
            scaler,
        })
    }
}

fn check_shapes(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), AppError> {
    if x.nrows() != y.len() {
        return Err(AppError::Numeric(format!(
            "feature rows ({}) and target length ({}) differ",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() < 2 {
        return Err(AppError::InsufficientData {
            stage: "model fit",
            rows: x.nrows(),
            needed: 2,
        });
    }
    Ok(())
}
