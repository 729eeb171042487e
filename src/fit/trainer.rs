//! Split → fit → evaluate over a cleaned table.

use chrono::Utc;

use crate::domain::{CleanTable, Evaluation, FittedModel, PipelineConfig};
use crate::error::AppError;
use crate::fit::backend::{Backend, backend_for};
use crate::fit::evaluate::evaluate;
use crate::fit::split::{Split, train_test_split};

/// Everything produced by one training run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub split: Split,
    pub model: FittedModel,
    pub evaluation: Evaluation,
}

/// Trains and evaluates a linear model with a pluggable backend.
pub struct Trainer {
    backend: Box<dyn Backend>,
    standardize: bool,
    test_fraction: f64,
    seed: u64,
}

impl Trainer {
    pub fn new(backend: Box<dyn Backend>, standardize: bool, test_fraction: f64, seed: u64) -> Self {
        Self {
            backend,
            standardize,
            test_fraction,
            seed,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            backend_for(config.backend, config.partitions),
            config.standardize,
            config.test_fraction,
            config.seed,
        )
    }

    /// Fit on the given rows of `table`.
    pub fn fit(&self, table: &CleanTable, rows: &[usize]) -> Result<FittedModel, AppError> {
        if rows.len() < 2 {
            return Err(AppError::InsufficientData {
                stage: "model fit",
                rows: rows.len(),
                needed: 2,
            });
        }
        let x = table.feature_matrix(rows);
        let y = table.target_vector(rows);

        let fit = self.backend.fit(&x, &y, self.standardize)?;
        tracing::info!(
            backend = self.backend.kind().display_name(),
            standardize = self.standardize,
            rows = rows.len(),
            intercept = fit.intercept,
            "fitted linear model"
        );

        Ok(FittedModel {
            features: table.contract.features.clone(),
            target: table.contract.target.clone(),
            weights: fit.weights,
            intercept: fit.intercept,
            scaler: fit.scaler,
            backend: self.backend.kind(),
            n_train: rows.len(),
            trained_at: Utc::now(),
        })
    }

    /// Score `model` on the given rows of `table`.
    pub fn evaluate(&self, model: &FittedModel, table: &CleanTable, rows: &[usize]) -> Result<Evaluation, AppError> {
        let predicted = model.predict(&table.feature_matrix(rows));
        let evaluation = evaluate(&predicted, &table.target_vector(rows))?;
        tracing::info!(rmse = evaluation.rmse, r2 = evaluation.r2, n = evaluation.n, "evaluated model");
        Ok(evaluation)
    }

    /// Split the table, fit on the train rows and evaluate on the held-out rows.
    pub fn train_and_evaluate(&self, table: &CleanTable) -> Result<TrainingRun, AppError> {
        let split = train_test_split(table.n_rows(), self.test_fraction, self.seed)?;
        let model = self.fit(table, &split.train)?;
        let evaluation = self.evaluate(&model, table, &split.test)?;
        Ok(TrainingRun {
            split,
            model,
            evaluation,
        })
    }
}
