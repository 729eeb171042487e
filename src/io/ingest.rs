//! CSV ingest and cleaning.
//!
//! This module is responsible for turning a raw survey export into a clean table
//! in which every contracted column holds a finite number.
//!
//! Design goals:
//! - **Strict schema** for contracted columns (all missing columns reported at once)
//! - **Row-level filtering** (drop incomplete rows, but report what happened)
//! - **Deterministic behavior** (row order is preserved)
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::{CleanTable, ColumnContract, PipelineConfig, SurveyRecord};
use crate::error::AppError;
use crate::io::export::save_clean;

/// Cell values that count as missing before numeric coercion.
const MISSING_TOKENS: [&str; 11] = [
    "", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "-NaN", "#N/A", "<NA>",
];

/// Raw table as read from disk: trimmed string cells, header row separate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse a headered CSV stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| AppError::csv("Failed to read CSV headers", e))?
            .iter()
            .map(normalize_header_name)
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // records() starts after the header, CSV lines are 1-based.
            let line = idx + 2;
            let record = result.map_err(|e| AppError::csv(format!("CSV parse error on line {line}"), e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Why a row was removed while cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// A contracted cell was empty or an NA token.
    Missing,
    /// A contracted cell could not be coerced to a finite number.
    NonNumeric,
}

/// A row removed during cleaning, with the first offending column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    pub line: usize,
    pub column: String,
    pub reason: DropReason,
}

/// What cleaning did to the raw table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped: Vec<DroppedRow>,
}

impl CleanReport {
    pub fn dropped_for(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }
}

/// Cleaning output: the table plus a summary of dropped rows.
#[derive(Debug, Clone)]
pub struct CleanedData {
    pub table: CleanTable,
    pub report: CleanReport,
}

/// Read the raw survey CSV.
pub fn load_raw(path: &Path) -> Result<RawTable, AppError> {
    if !path.exists() {
        return Err(AppError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}'", path.display()), e))?;
    let table = RawTable::from_reader(file)?;
    tracing::info!(
        path = %path.display(),
        rows = table.rows.len(),
        columns = table.headers.len(),
        "loaded raw table"
    );
    Ok(table)
}

/// Keep only contracted columns and drop every row that is missing or
/// non-numeric in any of them.
pub fn clean(raw: &RawTable, contract: &ColumnContract) -> Result<CleanTable, AppError> {
    Ok(clean_with_report(raw, contract, false)?.table)
}

/// [`clean`], plus the per-row drop report.
///
/// With `strict_numeric`, a non-numeric cell is an error instead of a dropped row.
pub fn clean_with_report(
    raw: &RawTable,
    contract: &ColumnContract,
    strict_numeric: bool,
) -> Result<CleanedData, AppError> {
    let indices = resolve_columns(raw, contract)?;
    let names: Vec<&str> = contract.columns().collect();
    let n_features = contract.n_features();

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut dropped = Vec::new();

    for (idx, row) in raw.rows.iter().enumerate() {
        let line = idx + 2;
        let cells: Vec<&str> = indices
            .iter()
            .map(|&i| row.get(i).map(String::as_str).unwrap_or(""))
            .collect();

        // Pass 1: explicit gaps.
        if let Some(pos) = cells.iter().position(|c| is_missing(c)) {
            dropped.push(DroppedRow {
                line,
                column: names[pos].to_string(),
                reason: DropReason::Missing,
            });
            continue;
        }

        // Pass 2: numeric coercion; failures become gaps too.
        let mut values = Vec::with_capacity(cells.len());
        let mut bad = None;
        for (pos, cell) in cells.iter().enumerate() {
            match parse_numeric(cell) {
                Some(v) => values.push(v),
                None => {
                    bad = Some(pos);
                    break;
                }
            }
        }
        if let Some(pos) = bad {
            if strict_numeric {
                return Err(AppError::NumericCoercion {
                    line,
                    column: names[pos].to_string(),
                    value: cells[pos].to_string(),
                });
            }
            dropped.push(DroppedRow {
                line,
                column: names[pos].to_string(),
                reason: DropReason::NonNumeric,
            });
            continue;
        }

        let target = values[n_features];
        values.truncate(n_features);
        records.push(SurveyRecord {
            features: values,
            target,
        });
    }

    let report = CleanReport {
        rows_read: raw.rows.len(),
        rows_kept: records.len(),
        dropped,
    };

    for d in report.dropped.iter().take(10) {
        tracing::debug!(line = d.line, column = %d.column, reason = ?d.reason, "dropped row");
    }
    tracing::info!(
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        dropped_missing = report.dropped_for(DropReason::Missing),
        dropped_non_numeric = report.dropped_for(DropReason::NonNumeric),
        "cleaned table"
    );

    Ok(CleanedData {
        table: CleanTable {
            contract: contract.clone(),
            records,
        },
        report,
    })
}

/// Load the raw file, clean it, persist the cleaned copy and return it.
pub fn load_and_clean(config: &PipelineConfig) -> Result<CleanedData, AppError> {
    let raw = load_raw(&config.raw_path)?;
    let cleaned = clean_with_report(&raw, &config.contract, config.strict_numeric)?;
    save_clean(&cleaned.table, &config.clean_path)?;
    Ok(cleaned)
}

impl CleanTable {
    /// Render back into a raw table (contract column order).
    ///
    /// Values use shortest round-trip formatting, so cleaning the result
    /// reproduces `self` exactly.
    pub fn to_raw(&self) -> RawTable {
        RawTable {
            headers: self.contract.columns().map(str::to_string).collect(),
            rows: self
                .records
                .iter()
                .map(|r| {
                    r.features
                        .iter()
                        .chain(std::iter::once(&r.target))
                        .map(|v| v.to_string())
                        .collect()
                })
                .collect(),
        }
    }
}

fn resolve_columns(raw: &RawTable, contract: &ColumnContract) -> Result<Vec<usize>, AppError> {
    let mut indices = Vec::with_capacity(contract.width());
    let mut missing = Vec::new();
    for name in contract.columns() {
        match raw.column_index(name) {
            Some(idx) => indices.push(idx),
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(AppError::Schema { missing });
    }
    Ok(indices)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM,
    // which would otherwise show up as a missing column.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

fn parse_numeric(cell: &str) -> Option<f64> {
    let v = cell.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FEATURE_COLUMNS;

    fn header() -> String {
        let mut cols: Vec<&str> = FEATURE_COLUMNS.to_vec();
        cols.push("PHQ9");
        cols.join(",")
    }

    fn row(gad7: &str, target: &str) -> String {
        let mut cells = vec![gad7.to_string()];
        cells.extend((1..12).map(|i| format!("{}.5", i)));
        cells.push(target.to_string());
        cells.join(",")
    }

    fn raw_from(lines: &[String]) -> RawTable {
        RawTable::from_reader(lines.join("\n").as_bytes()).unwrap()
    }

    #[test]
    fn drops_rows_with_missing_gad7() {
        let mut lines = vec![header()];
        for i in 0..100 {
            let gad7 = if i % 10 == 0 { String::new() } else { format!("{}", i % 21) };
            lines.push(row(&gad7, &format!("{}", i % 27)));
        }
        let raw = raw_from(&lines);
        let out = clean_with_report(&raw, &ColumnContract::default(), false).unwrap();

        assert_eq!(out.table.n_rows(), 90);
        assert_eq!(out.table.shape(), (90, 13));
        assert_eq!(out.report.rows_read, 100);
        assert_eq!(out.report.dropped_for(DropReason::Missing), 10);
        assert!(out.report.dropped.iter().all(|d| d.column == "GAD7"));
    }

    #[test]
    fn missing_target_column_is_a_schema_error() {
        let mut cols: Vec<&str> = FEATURE_COLUMNS.to_vec();
        cols.retain(|c| *c != "GPA");
        let lines = vec![cols.join(","), vec!["1"; 11].join(",")];
        let raw = raw_from(&lines);

        match clean(&raw, &ColumnContract::default()) {
            Err(AppError::Schema { missing }) => {
                assert_eq!(missing, vec!["GPA".to_string(), "PHQ9".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cells_are_dropped_or_fatal_when_strict() {
        let lines = vec![header(), row("3", "10"), row("high", "12"), row("4", "NA")];
        let raw = raw_from(&lines);

        let out = clean_with_report(&raw, &ColumnContract::default(), false).unwrap();
        assert_eq!(out.table.n_rows(), 1);
        assert_eq!(out.report.dropped_for(DropReason::NonNumeric), 1);
        assert_eq!(out.report.dropped_for(DropReason::Missing), 1);

        match clean_with_report(&raw, &ColumnContract::default(), true) {
            Err(AppError::NumericCoercion { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "GAD7");
                assert_eq!(value, "high");
            }
            other => panic!("expected coercion error, got {other:?}"),
        }
    }

    #[test]
    fn extra_columns_are_ignored_and_order_follows_contract() {
        let mut cols: Vec<&str> = FEATURE_COLUMNS.to_vec();
        cols.reverse();
        let header = format!("Id,PHQ9,{},Notes", cols.join(","));
        let values: Vec<String> = (0..12).rev().map(|i| i.to_string()).collect();
        let line = format!("s1,7,{},free text", values.join(","));
        let raw = raw_from(&[header, line]);

        let table = clean(&raw, &ColumnContract::default()).unwrap();
        assert_eq!(table.records[0].target, 7.0);
        let expected: Vec<f64> = (0..12).map(|i| i as f64).collect();
        assert_eq!(table.records[0].features, expected);
    }

    #[test]
    fn short_rows_count_as_missing() {
        let lines = vec![header(), "1,2,3".to_string(), row("2", "5")];
        let raw = raw_from(&lines);
        let out = clean_with_report(&raw, &ColumnContract::default(), false).unwrap();
        assert_eq!(out.table.n_rows(), 1);
        assert_eq!(out.report.dropped[0].line, 2);
        assert_eq!(out.report.dropped[0].reason, DropReason::Missing);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let lines = vec![
            header(),
            row("0.1", "3"),
            row("", "4"),
            row("2e1", "5"),
            row("x", "6"),
            row("-0.3333333333333333", "21"),
        ];
        let contract = ColumnContract::default();
        let once = clean(&raw_from(&lines), &contract).unwrap();
        let twice = clean(&once.to_raw(), &contract).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.n_rows(), 3);
    }

    #[test]
    fn empty_file_gives_empty_table() {
        let raw = raw_from(&[header()]);
        let table = clean(&raw, &ColumnContract::default()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn bom_prefixed_header_still_matches() {
        let lines = vec![format!("\u{feff}{}", header()), row("1", "2")];
        let table = clean(&raw_from(&lines), &ColumnContract::default()).unwrap();
        assert_eq!(table.n_rows(), 1);
    }

    #[test]
    fn load_raw_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        match load_raw(&path) {
            Err(AppError::NotFound { path: p }) => assert_eq!(p, path),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn load_and_clean_persists_the_clean_copy() {
        let dir = tempfile::tempdir().unwrap();
        let raw_path = dir.path().join("raw.csv");
        let lines = vec![header(), row("1", "2"), row("", "3")];
        std::fs::write(&raw_path, lines.join("\n")).unwrap();

        let config = PipelineConfig {
            raw_path,
            clean_path: dir.path().join("clean/out.csv"),
            ..PipelineConfig::default()
        };
        let out = load_and_clean(&config).unwrap();
        assert_eq!(out.table.n_rows(), 1);

        let reread = load_raw(&config.clean_path).unwrap();
        assert_eq!(clean(&reread, &config.contract).unwrap(), out.table);
    }
}
