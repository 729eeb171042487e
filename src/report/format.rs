//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the cleaning/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{CleanTable, Evaluation, FittedModel, PipelineConfig};
use crate::fit::TrainingRun;
use crate::io::{CleanReport, DropReason};
use crate::math::describe;

/// `Data shape after cleaning: (rows, cols)`.
pub fn format_shape(table: &CleanTable) -> String {
    let (rows, cols) = table.shape();
    format!("Data shape after cleaning: ({rows}, {cols})\n")
}

/// Rows read/kept and drop counts by reason.
pub fn format_clean_summary(report: &CleanReport) -> String {
    format!(
        "Rows read: {} | kept: {} | dropped (missing): {} | dropped (non-numeric): {}\n",
        report.rows_read,
        report.rows_kept,
        report.dropped_for(DropReason::Missing),
        report.dropped_for(DropReason::NonNumeric),
    )
}

/// The first `n` rows with a header line.
pub fn format_head(table: &CleanTable, n: usize) -> String {
    let names: Vec<&str> = table.contract.columns().collect();
    let widths: Vec<usize> = names.iter().map(|c| c.len().max(8)).collect();

    let mut out = String::new();
    let header: Vec<String> = names
        .iter()
        .zip(&widths)
        .map(|(name, &w)| format!("{name:>w$}"))
        .collect();
    out.push_str(&format!("{:>5} {}\n", "", header.join(" ")));

    for (i, record) in table.records.iter().take(n).enumerate() {
        let cells: Vec<String> = record
            .features
            .iter()
            .chain(std::iter::once(&record.target))
            .zip(&widths)
            .map(|(v, &w)| format!("{:>w$}", fmt_num(*v, 3)))
            .collect();
        out.push_str(&format!("{i:>5} {}\n", cells.join(" ")));
    }
    out
}

/// Descriptive statistics, one line per contracted column.
pub fn format_describe(table: &CleanTable) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>7} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}\n",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    ));
    out.push_str(&format!(
        "{:-<16} {:-<7} {:-<9} {:-<9} {:-<9} {:-<9} {:-<9} {:-<9} {:-<9}\n",
        "", "", "", "", "", "", "", "", ""
    ));

    for (idx, name) in table.contract.columns().enumerate() {
        let s = describe(&table.column(idx));
        out.push_str(&format!(
            "{:<16} {:>7} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}\n",
            truncate(name, 16),
            s.count,
            fmt_num(s.mean, 3),
            fmt_num(s.std, 3),
            fmt_num(s.min, 3),
            fmt_num(s.q25, 3),
            fmt_num(s.median, 3),
            fmt_num(s.q75, 3),
            fmt_num(s.max, 3),
        ));
    }
    out
}

/// RMSE / R² / MAE block.
pub fn format_evaluation(evaluation: &Evaluation) -> String {
    let mut out = String::new();
    out.push_str(&format!("Model performance (test n={}):\n", evaluation.n));
    out.push_str(&format!("RMSE: {}\n", fmt_num(evaluation.rmse, 3)));
    out.push_str(&format!("R²:   {}\n", fmt_num(evaluation.r2, 3)));
    out.push_str(&format!("MAE:  {}\n", fmt_num(evaluation.mae, 3)));
    out
}

/// Per-feature coefficients in contract order, then the intercept.
///
/// Standardized models also show the equivalent raw-scale coefficient.
pub fn format_coefficients(model: &FittedModel) -> String {
    let mut out = String::new();
    match &model.scaler {
        None => {
            out.push_str("Coefficients:\n");
            for (feature, coef) in model.coefficients() {
                out.push_str(&format!("{feature:15} -> {}\n", signed(coef)));
            }
            out.push_str(&format!("{:15} -> {}\n", "(intercept)", signed(model.intercept)));
        }
        Some(_) => {
            let (raw, raw_intercept) = model.raw_scale_coefficients();
            out.push_str("Coefficients (standardized features; raw-scale equivalent in brackets):\n");
            for ((feature, coef), raw) in model.coefficients().zip(&raw) {
                out.push_str(&format!("{feature:15} -> {}   [{}]\n", signed(coef), signed(*raw)));
            }
            out.push_str(&format!(
                "{:15} -> {}   [{}]\n",
                "(intercept)",
                signed(model.intercept),
                signed(raw_intercept)
            ));
        }
    }
    out
}

/// Full `train` report: data overview, fit settings, metrics, coefficients.
pub fn format_run_summary(
    table: &CleanTable,
    report: &CleanReport,
    run: &TrainingRun,
    config: &PipelineConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== phq9 - PHQ-9 Linear Regression ===\n");
    out.push_str(&format_shape(table));
    out.push_str(&format_clean_summary(report));
    out.push_str("\nDescriptive statistics:\n");
    out.push_str(&format_describe(table));

    out.push_str(&format!(
        "\nTraining: backend={} | standardize={} | split train={} test={} | seed={}\n\n",
        run.model.backend.display_name(),
        config.standardize,
        run.split.train.len(),
        run.split.test.len(),
        config.seed,
    ));
    out.push_str(&format_evaluation(&run.evaluation));
    out.push('\n');
    out.push_str(&format_coefficients(&run.model));
    out
}

fn fmt_num(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        "undefined".to_string()
    } else {
        format!("{v:.decimals$}")
    }
}

/// Four decimals with a leading space in place of `+`, so signs line up.
fn signed(v: f64) -> String {
    if v.is_sign_negative() {
        format!("{v:.4}")
    } else {
        format!(" {v:.4}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BackendKind, ColumnContract, SurveyRecord};
    use crate::fit::StandardScaler;
    use chrono::Utc;

    fn model(scaler: Option<StandardScaler>) -> FittedModel {
        FittedModel {
            features: vec!["GAD7".to_string(), "SleepHours".to_string()],
            target: "PHQ9".to_string(),
            weights: vec![0.5, -1.25],
            intercept: 3.0,
            scaler,
            backend: BackendKind::Local,
            n_train: 8,
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn coefficients_follow_contract_order() {
        let text = format_coefficients(&model(None));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Coefficients:");
        assert_eq!(lines[1], "GAD7            ->  0.5000");
        assert_eq!(lines[2], "SleepHours      -> -1.2500");
        assert_eq!(lines[3], "(intercept)     ->  3.0000");
    }

    #[test]
    fn standardized_coefficients_show_raw_equivalent() {
        let scaler = StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![2.0, 1.0],
        };
        let text = format_coefficients(&model(Some(scaler)));
        assert!(text.contains("GAD7            ->  0.5000   [ 0.2500]"));
    }

    #[test]
    fn negative_intercept_keeps_column_alignment() {
        let mut m = model(None);
        m.intercept = -0.125;
        let text = format_coefficients(&m);
        assert!(text.contains("(intercept)     -> -0.1250"));
        assert_eq!(signed(0.0), " 0.0000");
        assert_eq!(signed(-2.5), "-2.5000");
    }

    #[test]
    fn undefined_r2_is_labelled() {
        let text = format_evaluation(&Evaluation {
            rmse: 0.5,
            r2: f64::NAN,
            mae: 0.5,
            n: 3,
        });
        assert!(text.contains("RMSE: 0.500"));
        assert!(text.contains("R²:   undefined"));
    }

    #[test]
    fn shape_and_describe_cover_every_column() {
        let contract = ColumnContract {
            features: vec!["GAD7".to_string()],
            target: "PHQ9".to_string(),
        };
        let table = CleanTable {
            contract,
            records: vec![
                SurveyRecord { features: vec![1.0], target: 4.0 },
                SurveyRecord { features: vec![3.0], target: 8.0 },
            ],
        };
        assert_eq!(format_shape(&table), "Data shape after cleaning: (2, 2)\n");

        let describe = format_describe(&table);
        assert_eq!(describe.lines().count(), 4);
        assert!(describe.lines().nth(3).unwrap().starts_with("PHQ9"));

        let head = format_head(&table, 1);
        assert_eq!(head.lines().count(), 2);
    }
}
