//! Ordinary least squares solvers.
//!
//! We solve small linear regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - b - x_i^T w)^2
//! ```
//!
//! Two entry points share one SVD core:
//! - `solve_least_squares` works on the full design matrix (sequential path)
//! - `solve_normal_equations` works on an accumulated Gram matrix `XᵀX` and
//!   `Xᵀy` (partitioned path, where rows never live in one matrix)
//!
//! SVD keeps both robust when columns are collinear or the system is
//! underdetermined: the minimum-norm solution is returned.

use nalgebra::{DMatrix, DVector};

/// Prepend a constant column so the first coefficient is the intercept.
pub fn with_intercept(x: &DMatrix<f64>) -> DMatrix<f64> {
    x.clone().insert_column(0, 1.0)
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve `(XᵀX) β = Xᵀy` given the accumulated Gram matrix and moment vector.
pub fn solve_normal_equations(gram: &DMatrix<f64>, xty: &DVector<f64>) -> Option<DVector<f64>> {
    // Singular values of XᵀX are squared, so the cutoff is scaled to the
    // largest one rather than fixed.
    let svd = gram.clone().svd(true, true);
    let max_sv = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    if !max_sv.is_finite() {
        return None;
    }

    for &rel in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(xty, rel * max_sv.max(f64::MIN_POSITIVE)) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
