//! Synthetic survey generation.
//!
//! Produces a raw table shaped like the real survey export (an id column, the
//! contracted predictors and `PHQ9`) so the pipeline can be exercised without
//! the private dataset. Every respondent gets a latent distress level that
//! drives the predictors; `PHQ9` is a noisy linear function of the predictors.
//! Optional gaps and junk cells exercise the cleaner.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{FEATURE_COLUMNS, TARGET_COLUMN};
use crate::error::AppError;
use crate::io::RawTable;

/// Values written into cells chosen for corruption.
const JUNK_VALUES: [&str; 4] = ["unknown", "?", "ten", "5 hours"];

#[derive(Debug, Clone, Copy)]
struct FeatureSpec {
    center: f64,
    /// Response to the latent distress level.
    loading: f64,
    noise: f64,
    min: f64,
    max: f64,
    decimals: i32,
    /// Contribution to PHQ9 per unit of the feature.
    effect: f64,
}

/// One entry per column of `FEATURE_COLUMNS`, same order.
const FEATURE_SPECS: [FeatureSpec; 12] = [
    // GAD7
    FeatureSpec { center: 7.0, loading: 4.0, noise: 2.0, min: 0.0, max: 21.0, decimals: 0, effect: 0.55 },
    // SleepHours
    FeatureSpec { center: 7.0, loading: -0.6, noise: 1.0, min: 3.0, max: 11.0, decimals: 1, effect: -0.4 },
    // ExerciseFreq
    FeatureSpec { center: 3.0, loading: -0.8, noise: 1.5, min: 0.0, max: 7.0, decimals: 0, effect: -0.3 },
    // SocialActivity
    FeatureSpec { center: 5.0, loading: -1.0, noise: 2.0, min: 0.0, max: 10.0, decimals: 0, effect: -0.2 },
    // ScreenTime
    FeatureSpec { center: 5.0, loading: 0.8, noise: 2.0, min: 0.0, max: 16.0, decimals: 1, effect: 0.15 },
    // AcademicStress
    FeatureSpec { center: 5.5, loading: 1.5, noise: 1.5, min: 1.0, max: 10.0, decimals: 0, effect: 0.35 },
    // DietQuality
    FeatureSpec { center: 6.0, loading: -0.7, noise: 1.5, min: 1.0, max: 10.0, decimals: 0, effect: -0.1 },
    // PeerRelationship
    FeatureSpec { center: 6.5, loading: -1.0, noise: 1.5, min: 1.0, max: 10.0, decimals: 0, effect: -0.25 },
    // FinancialStress
    FeatureSpec { center: 5.0, loading: 1.0, noise: 2.0, min: 1.0, max: 10.0, decimals: 0, effect: 0.2 },
    // SleepQuality
    FeatureSpec { center: 6.0, loading: -1.2, noise: 1.5, min: 1.0, max: 10.0, decimals: 0, effect: -0.3 },
    // GPA
    FeatureSpec { center: 3.0, loading: -0.2, noise: 0.4, min: 0.0, max: 4.0, decimals: 2, effect: -0.5 },
    // FamilySupport
    FeatureSpec { center: 6.5, loading: -1.0, noise: 1.8, min: 1.0, max: 10.0, decimals: 0, effect: -0.3 },
];

const PHQ9_BASE: f64 = 13.0;
const PHQ9_NOISE: f64 = 2.0;

/// Synthetic survey settings.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    /// Probability that a row gets one blank contracted cell.
    pub missing_rate: f64,
    /// Probability that a row gets one non-numeric contracted cell.
    pub invalid_rate: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 500,
            seed: 42,
            missing_rate: 0.05,
            invalid_rate: 0.02,
        }
    }
}

/// Generate a raw survey table.
pub fn generate_survey(config: &SampleConfig) -> Result<RawTable, AppError> {
    if config.rows == 0 {
        return Err(AppError::InvalidConfig("sample row count must be > 0".to_string()));
    }
    let rates_ok = (0.0..1.0).contains(&config.missing_rate)
        && (0.0..1.0).contains(&config.invalid_rate)
        && config.missing_rate + config.invalid_rate < 1.0;
    if !rates_ok {
        return Err(AppError::InvalidConfig(
            "missing/invalid rates must be in [0, 1) and sum to < 1".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let std_normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::Numeric(format!("Noise distribution error: {e}")))?;

    let mut headers = vec!["StudentID".to_string()];
    headers.extend(FEATURE_COLUMNS.iter().map(|c| c.to_string()));
    headers.push(TARGET_COLUMN.to_string());
    let n_contracted = FEATURE_COLUMNS.len() + 1;

    let mut rows = Vec::with_capacity(config.rows);
    for i in 0..config.rows {
        let distress: f64 = std_normal.sample(&mut rng);

        let mut row = Vec::with_capacity(headers.len());
        row.push(format!("S{:05}", i + 1));

        let mut phq9 = PHQ9_BASE;
        for spec in &FEATURE_SPECS {
            let z: f64 = std_normal.sample(&mut rng);
            let raw = spec.center + spec.loading * distress + spec.noise * z;
            let value = round_to(raw.clamp(spec.min, spec.max), spec.decimals);
            phq9 += spec.effect * value;
            row.push(format_value(value, spec.decimals));
        }
        let z: f64 = std_normal.sample(&mut rng);
        let phq9 = (phq9 + PHQ9_NOISE * z).round().clamp(0.0, 27.0);
        row.push(format_value(phq9, 0));

        // Corrupt at most one cell per row; column 0 is the id.
        let roll: f64 = rng.r#gen();
        if roll < config.missing_rate + config.invalid_rate {
            let col = 1 + rng.gen_range(0..n_contracted);
            row[col] = if roll < config.missing_rate {
                String::new()
            } else {
                JUNK_VALUES[rng.gen_range(0..JUNK_VALUES.len())].to_string()
            };
        }

        rows.push(row);
    }

    tracing::info!(rows = rows.len(), seed = config.seed, "generated synthetic survey");
    Ok(RawTable { headers, rows })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

fn format_value(value: f64, decimals: i32) -> String {
    format!("{:.*}", decimals.max(0) as usize, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnContract;
    use crate::io::{DropReason, clean_with_report};

    #[test]
    fn same_seed_same_table() {
        let config = SampleConfig { rows: 50, ..SampleConfig::default() };
        assert_eq!(generate_survey(&config).unwrap(), generate_survey(&config).unwrap());
    }

    #[test]
    fn clean_sample_passes_the_cleaner_untouched() {
        let config = SampleConfig {
            rows: 200,
            seed: 1,
            missing_rate: 0.0,
            invalid_rate: 0.0,
        };
        let raw = generate_survey(&config).unwrap();
        let out = clean_with_report(&raw, &ColumnContract::default(), false).unwrap();
        assert_eq!(out.table.n_rows(), 200);
        assert!(out.table.records.iter().all(|r| (0.0..=27.0).contains(&r.target)));
    }

    #[test]
    fn corrupted_rows_are_dropped_by_reason() {
        let config = SampleConfig {
            rows: 400,
            seed: 5,
            missing_rate: 0.1,
            invalid_rate: 0.1,
        };
        let raw = generate_survey(&config).unwrap();
        let out = clean_with_report(&raw, &ColumnContract::default(), false).unwrap();
        let missing = out.report.dropped_for(DropReason::Missing);
        let invalid = out.report.dropped_for(DropReason::NonNumeric);
        assert!(missing > 0 && invalid > 0);
        assert_eq!(out.table.n_rows() + missing + invalid, 400);
    }

    #[test]
    fn rejects_bad_rates() {
        let config = SampleConfig {
            missing_rate: 0.6,
            invalid_rate: 0.5,
            ..SampleConfig::default()
        };
        assert!(matches!(generate_survey(&config), Err(AppError::InvalidConfig(_))));
    }
}
