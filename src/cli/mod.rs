//! Command-line parsing for the PHQ-9 regression pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/modeling code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    BackendKind, DEFAULT_CLEAN_PATH, DEFAULT_MODEL_PATH, DEFAULT_RAW_PATH, DEFAULT_SAMPLE_PATH,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "phq9", version, about = "PHQ-9 survey cleaning and linear regression")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean the raw survey and write the cleaned CSV.
    Clean(PipelineArgs),
    /// Clean, then print the first rows and descriptive statistics.
    Eda(PipelineArgs),
    /// Clean, split, fit, evaluate and persist the model (default).
    Train(PipelineArgs),
    /// Print the coefficients of a persisted model.
    Inspect(InspectArgs),
    /// Write a synthetic raw survey CSV.
    Sample(SampleArgs),
}

/// Options shared by the pipeline commands.
#[derive(Debug, Args, Clone)]
pub struct PipelineArgs {
    /// Raw survey CSV.
    #[arg(long, default_value = DEFAULT_RAW_PATH)]
    pub raw: PathBuf,

    /// Destination of the cleaned CSV.
    #[arg(long, default_value = DEFAULT_CLEAN_PATH)]
    pub clean: PathBuf,

    /// Model artifact directory.
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Fitting backend.
    #[arg(short = 'b', long, value_enum, default_value_t = BackendKind::Local)]
    pub backend: BackendKind,

    /// Standardize features before fitting.
    #[arg(long)]
    pub standardize: bool,

    /// Row partitions for the parallel backend (default: one per thread).
    #[arg(long)]
    pub partitions: Option<usize>,

    /// Seed for the train/test shuffle.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Fail on non-numeric cells instead of dropping the row.
    #[arg(long)]
    pub strict: bool,

    /// Rows shown by `clean` and `eda`.
    #[arg(long, default_value_t = 5)]
    pub head: usize,

    /// Do not persist the fitted model.
    #[arg(long)]
    pub no_save: bool,
}

/// Options for inspecting a saved model.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Model directory (or its `model.json`).
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,
}

/// Options for synthetic survey generation.
#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, default_value = DEFAULT_SAMPLE_PATH)]
    pub output: PathBuf,

    /// Replace an existing file at the output path.
    #[arg(long)]
    pub force: bool,

    /// Number of respondents.
    #[arg(short = 'n', long, default_value_t = 500)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability that a row gets a blank cell.
    #[arg(long, default_value_t = 0.05)]
    pub missing_rate: f64,

    /// Probability that a row gets a non-numeric cell.
    #[arg(long, default_value_t = 0.02)]
    pub invalid_rate: f64,
}
