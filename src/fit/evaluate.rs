//! Held-out regression metrics.

use nalgebra::DVector;

use crate::domain::Evaluation;
use crate::error::AppError;

/// Root-mean-squared error. NaN for empty input.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    (sse(predicted, actual) / actual.len() as f64).sqrt()
}

pub fn mae(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination.
///
/// Exact predictions score 1.0 even on a constant target; otherwise a constant
/// target leaves R² undefined and NaN is returned.
pub fn r2(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    let ss_res = sse(predicted, actual);
    if ss_res == 0.0 {
        return 1.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return f64::NAN;
    }
    1.0 - ss_res / ss_tot
}

pub fn evaluate(predicted: &DVector<f64>, actual: &DVector<f64>) -> Result<Evaluation, AppError> {
    if predicted.len() != actual.len() {
        return Err(AppError::Numeric(format!(
            "prediction count ({}) differs from target count ({})",
            predicted.len(),
            actual.len()
        )));
    }
    if actual.is_empty() {
        return Err(AppError::InsufficientData {
            stage: "evaluation",
            rows: 0,
            needed: 1,
        });
    }
    if predicted.iter().any(|v| !v.is_finite()) {
        return Err(AppError::Numeric("non-finite model prediction during evaluation".to_string()));
    }

    let (p, a) = (predicted.as_slice(), actual.as_slice());
    Ok(Evaluation {
        rmse: rmse(p, a),
        r2: r2(p, a),
        mae: mae(p, a),
        n: a.len(),
    })
}

fn sse(predicted: &[f64], actual: &[f64]) -> f64 {
    predicted.iter().zip(actual).map(|(p, a)| (p - a).powi(2)).sum()
}
