//! Write tables to CSV.
//!
//! The cleaned export is meant to be easy to consume in spreadsheets or
//! downstream scripts: contract columns only, header row, no missing values.

use std::fs::create_dir_all;
use std::path::Path;

use crate::domain::CleanTable;
use crate::error::AppError;
use crate::io::ingest::RawTable;

/// Write the cleaned table, creating parent directories as needed.
///
/// Overwrites any existing file at `path`.
pub fn save_clean(table: &CleanTable, path: &Path) -> Result<(), AppError> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::csv(format!("Failed to create clean CSV '{}'", path.display()), e))?;

    writer
        .write_record(table.contract.columns())
        .map_err(|e| AppError::csv("Failed to write clean CSV header", e))?;

    for record in &table.records {
        let cells = record
            .features
            .iter()
            .chain(std::iter::once(&record.target))
            .map(|v| v.to_string());
        writer
            .write_record(cells)
            .map_err(|e| AppError::csv("Failed to write clean CSV row", e))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush clean CSV '{}'", path.display()), e))?;

    tracing::info!(path = %path.display(), rows = table.n_rows(), "saved clean table");
    Ok(())
}

/// Write a raw (string-celled) table as headered CSV.
pub fn write_raw(table: &RawTable, path: &Path) -> Result<(), AppError> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::csv(format!("Failed to create CSV '{}'", path.display()), e))?;
    writer
        .write_record(&table.headers)
        .map_err(|e| AppError::csv("Failed to write CSV header", e))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::csv("Failed to write CSV row", e))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV '{}'", path.display()), e))?;
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}'", parent.display()), e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnContract, SurveyRecord};

    #[test]
    fn writes_header_and_rows_in_contract_order() {
        let contract = ColumnContract {
            features: vec!["GAD7".to_string(), "GPA".to_string()],
            target: "PHQ9".to_string(),
        };
        let table = CleanTable {
            contract,
            records: vec![
                SurveyRecord { features: vec![3.0, 3.25], target: 9.0 },
                SurveyRecord { features: vec![0.1, 2.0], target: 1.5 },
            ],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/clean.csv");
        save_clean(&table, &path).unwrap();
        // Second write overwrites rather than appends.
        save_clean(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "GAD7,GPA,PHQ9\n3,3.25,9\n0.1,2,1.5\n");
    }

    #[test]
    fn raw_tables_round_trip_including_blank_cells() {
        let table = RawTable {
            headers: vec!["id".to_string(), "GAD7".to_string()],
            rows: vec![
                vec!["a".to_string(), String::new()],
                vec!["b".to_string(), "7".to_string()],
            ],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        write_raw(&table, &path).unwrap();

        let back = crate::io::load_raw(&path).unwrap();
        assert_eq!(back, table);
    }
}
