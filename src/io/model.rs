//! Read/write the fitted model artifact.
//!
//! The artifact is a directory holding `model.json`: feature names, weights,
//! intercept, optional scaler and run metadata. Writing always replaces the
//! previous artifact; there is no versioning.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::FittedModel;
use crate::error::AppError;

pub const MODEL_FILE_NAME: &str = "model.json";

/// Write the model into the artifact directory `dir`.
///
/// Returns the path of the JSON file written.
pub fn write_model(dir: &Path, model: &FittedModel) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create model directory '{}'", dir.display()), e))?;

    let path = dir.join(MODEL_FILE_NAME);
    let file = File::create(&path)
        .map_err(|e| AppError::io(format!("Failed to create model file '{}'", path.display()), e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, model)
        .map_err(|e| AppError::artifact("Failed to write model JSON", e))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush model file '{}'", path.display()), e))?;

    tracing::info!(path = %path.display(), "saved model artifact");
    Ok(path)
}

/// Read a model artifact; `path` may be the artifact directory or the JSON file.
pub fn read_model(path: &Path) -> Result<FittedModel, AppError> {
    let file_path = if path.is_dir() {
        path.join(MODEL_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    if !file_path.exists() {
        return Err(AppError::NotFound { path: file_path });
    }

    let file = File::open(&file_path)
        .map_err(|e| AppError::io(format!("Failed to open model file '{}'", file_path.display()), e))?;
    let model: FittedModel = serde_json::from_reader(file)
        .map_err(|e| AppError::artifact(format!("Invalid model JSON '{}'", file_path.display()), e))?;

    if model.weights.len() != model.features.len() {
        return Err(AppError::InvalidConfig(format!(
            "model artifact has {} weights for {} features",
            model.weights.len(),
            model.features.len()
        )));
    }
    if let Some(scaler) = &model.scaler {
        let n = model.features.len();
        if scaler.mean.len() != n || scaler.scale.len() != n {
            return Err(AppError::InvalidConfig(format!(
                "model artifact scaler has {} means and {} scales for {} features",
                scaler.mean.len(),
                scaler.scale.len(),
                n
            )));
        }
    }
    Ok(model)
}
