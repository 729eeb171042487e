//! Shared pipeline logic used by the `clean`, `eda` and `train` commands.
//!
//! load -> clean -> split -> fit -> evaluate -> (persist)

use std::path::PathBuf;

use crate::domain::PipelineConfig;
use crate::error::AppError;
use crate::fit::{Trainer, TrainingRun};
use crate::io::{CleanedData, load_and_clean, write_model};

/// All computed outputs of a single `phq9 train` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub cleaned: CleanedData,
    pub run: TrainingRun,
    /// Where the model was written, if it was.
    pub saved_to: Option<PathBuf>,
}

/// Load and clean only.
pub fn run_clean(config: &PipelineConfig) -> Result<CleanedData, AppError> {
    config.validate()?;
    let cleaned = load_and_clean(config)?;
    tracing::info!(
        rows_read = cleaned.report.rows_read,
        rows_kept = cleaned.report.rows_kept,
        dropped = cleaned.report.dropped.len(),
        "cleaned survey"
    );
    Ok(cleaned)
}

/// Execute the full training pipeline.
pub fn run_training(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    let cleaned = run_clean(config)?;

    let trainer = Trainer::from_config(config);
    let run = trainer.train_and_evaluate(&cleaned.table)?;

    let saved_to = if config.save_model {
        let path = write_model(&config.model_path, &run.model)?;
        tracing::info!(path = %path.display(), "saved model");
        Some(path)
    } else {
        None
    };

    Ok(RunOutput {
        cleaned,
        run,
        saved_to,
    })
}
