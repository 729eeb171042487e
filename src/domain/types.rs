//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed explicitly between pipeline stages
//! - persisted (the fitted model artifact)
//! - reloaded later for inspection or comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::fit::StandardScaler;

/// Default location of the raw survey export.
pub const DEFAULT_RAW_PATH: &str = "data/raw/mental_health.csv";
/// Default location of the cleaned table.
pub const DEFAULT_CLEAN_PATH: &str = "data/clean/mental_health_clean.csv";
/// Default output of the synthetic survey generator.
pub const DEFAULT_SAMPLE_PATH: &str = "data/raw/sample_survey.csv";
/// Default location of the model artifact directory.
pub const DEFAULT_MODEL_PATH: &str = "artifacts/phq9_lr_model";

/// Depression-severity score the model predicts.
pub const TARGET_COLUMN: &str = "PHQ9";

/// Predictors, in the order coefficients are fitted and reported.
pub const FEATURE_COLUMNS: [&str; 12] = [
    "GAD7",
    "SleepHours",
    "ExerciseFreq",
    "SocialActivity",
    "ScreenTime",
    "AcademicStress",
    "DietQuality",
    "PeerRelationship",
    "FinancialStress",
    "SleepQuality",
    "GPA",
    "FamilySupport",
];

/// Ordered feature names plus the single target name.
///
/// This is the only interface between cleaning and modeling: every consumer
/// addresses columns through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnContract {
    pub features: Vec<String>,
    pub target: String,
}

impl Default for ColumnContract {
    fn default() -> Self {
        Self {
            features: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            target: TARGET_COLUMN.to_string(),
        }
    }
}

impl ColumnContract {
    /// Features followed by the target.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.target.as_str()))
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Number of contracted columns (features + target).
    pub fn width(&self) -> usize {
        self.features.len() + 1
    }
}

/// Which backend fits the linear model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Sequential, in-process least squares over the whole design matrix.
    Local,
    /// Staged assemble → standardize → regress pipeline over row partitions,
    /// executed on a rayon pool.
    Parallel,
}

impl BackendKind {
    pub fn display_name(self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Parallel => "parallel",
        }
    }
}

/// Resolved run configuration passed into every stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub raw_path: PathBuf,
    pub clean_path: PathBuf,
    pub model_path: PathBuf,
    pub contract: ColumnContract,
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f64,
    pub seed: u64,
    pub backend: BackendKind,
    /// Rescale features to zero mean / unit variance before fitting.
    ///
    /// Applied identically by both backends.
    pub standardize: bool,
    /// Row partitions for the parallel backend (`None` = one per rayon thread).
    pub partitions: Option<usize>,
    pub save_model: bool,
    /// Fail on non-numeric cells instead of dropping the row.
    pub strict_numeric: bool,
    pub head_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from(DEFAULT_RAW_PATH),
            clean_path: PathBuf::from(DEFAULT_CLEAN_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            contract: ColumnContract::default(),
            test_fraction: 0.2,
            seed: 42,
            backend: BackendKind::Local,
            standardize: false,
            partitions: None,
            save_model: true,
            strict_numeric: false,
            head_rows: 5,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AppError::InvalidConfig(format!(
                "test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.partitions == Some(0) {
            return Err(AppError::InvalidConfig("partitions must be > 0".to_string()));
        }
        if self.contract.features.is_empty() {
            return Err(AppError::InvalidConfig(
                "column contract has no feature columns".to_string(),
            ));
        }
        Ok(())
    }
}

/// One cleaned observation: every contracted column is a finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    /// Feature values in contract order.
    pub features: Vec<f64>,
    pub target: f64,
}

/// Output of cleaning; immutable input to training.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable {
    pub contract: ColumnContract,
    pub records: Vec<SurveyRecord>,
}

impl CleanTable {
    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(rows, columns)` like a dataframe shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), self.contract.width())
    }

    /// Values of contracted column `idx` (features first, target last).
    pub fn column(&self, idx: usize) -> Vec<f64> {
        let n_features = self.contract.n_features();
        self.records
            .iter()
            .map(|r| if idx < n_features { r.features[idx] } else { r.target })
            .collect()
    }

    /// Feature matrix for the given rows, one row per record.
    pub fn feature_matrix(&self, rows: &[usize]) -> DMatrix<f64> {
        let p = self.contract.n_features();
        DMatrix::from_fn(rows.len(), p, |i, j| self.records[rows[i]].features[j])
    }

    pub fn target_vector(&self, rows: &[usize]) -> DVector<f64> {
        DVector::from_iterator(rows.len(), rows.iter().map(|&i| self.records[i].target))
    }
}

/// Trained linear model: one weight per feature plus an intercept.
///
/// When `scaler` is present the weights apply to standardized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub features: Vec<String>,
    pub target: String,
    pub weights: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub backend: BackendKind,
    pub n_train: usize,
    pub trained_at: DateTime<Utc>,
}

impl FittedModel {
    /// Predict the target for a single row of raw (unscaled) feature values.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        let dot: f64 = match &self.scaler {
            Some(scaler) => features
                .iter()
                .enumerate()
                .map(|(j, &x)| scaler.transform_value(j, x) * self.weights[j])
                .sum(),
            None => features.iter().zip(&self.weights).map(|(x, w)| x * w).sum(),
        };
        self.intercept + dot
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> DVector<f64> {
        DVector::from_iterator(
            x.nrows(),
            x.row_iter()
                .map(|row| self.predict_row(&row.iter().copied().collect::<Vec<_>>())),
        )
    }

    /// Coefficients and intercept expressed on the raw feature scale.
    ///
    /// Identity when the model was fitted without standardization.
    pub fn raw_scale_coefficients(&self) -> (Vec<f64>, f64) {
        let Some(scaler) = &self.scaler else {
            return (self.weights.clone(), self.intercept);
        };
        let weights: Vec<f64> = self
            .weights
            .iter()
            .zip(&scaler.scale)
            .map(|(w, s)| w / s)
            .collect();
        let shift: f64 = weights.iter().zip(&scaler.mean).map(|(w, m)| w * m).sum();
        (weights, self.intercept - shift)
    }

    /// `(feature, weight)` pairs in contract order.
    pub fn coefficients(&self) -> impl Iterator<Item = (&str, f64)> {
        self.features
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }
}

/// Held-out evaluation of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub rmse: f64,
    /// Coefficient of determination; NaN when the held-out target is constant
    /// and the predictions are not exact.
    pub r2: f64,
    pub mae: f64,
    pub n: usize,
}
