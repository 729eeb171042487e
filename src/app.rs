//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs cleaning, EDA or training
//! - prints reports
//! - reads back saved models and writes synthetic surveys

use std::path::Path;

use clap::Parser;

use crate::cli::{Command, InspectArgs, PipelineArgs, SampleArgs};
use crate::data::{SampleConfig, generate_survey};
use crate::domain::{ColumnContract, PipelineConfig};
use crate::error::AppError;
use crate::io::{read_model, write_raw};
use crate::report;

pub mod pipeline;

/// Entry point for the `phq9` binary.
pub fn run() -> Result<(), AppError> {
    // `phq9` and `phq9 --backend parallel` behave like `phq9 train ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Clean(args) => handle_clean(&args),
        Command::Eda(args) => handle_eda(&args),
        Command::Train(args) => handle_train(&args),
        Command::Inspect(args) => handle_inspect(&args),
        Command::Sample(args) => handle_sample(&args),
    }
}

fn handle_clean(args: &PipelineArgs) -> Result<(), AppError> {
    let config = config_from_args(args);
    let cleaned = pipeline::run_clean(&config)?;

    print!("{}", report::format_shape(&cleaned.table));
    print!("{}", report::format_clean_summary(&cleaned.report));
    println!("{}", report::format_head(&cleaned.table, config.head_rows));
    println!("Cleaned data written to {}", config.clean_path.display());
    Ok(())
}

fn handle_eda(args: &PipelineArgs) -> Result<(), AppError> {
    let config = config_from_args(args);
    let cleaned = pipeline::run_clean(&config)?;

    print!("{}", report::format_shape(&cleaned.table));
    println!("{}", report::format_head(&cleaned.table, config.head_rows));
    print!("{}", report::format_describe(&cleaned.table));
    Ok(())
}

fn handle_train(args: &PipelineArgs) -> Result<(), AppError> {
    let config = config_from_args(args);
    let out = pipeline::run_training(&config)?;

    print!(
        "{}",
        report::format_run_summary(&out.cleaned.table, &out.cleaned.report, &out.run, &config)
    );
    if let Some(path) = &out.saved_to {
        println!("\nModel saved to {}", path.display());
    }
    Ok(())
}

fn handle_inspect(args: &InspectArgs) -> Result<(), AppError> {
    let model = read_model(&args.model)?;

    println!(
        "Model: target={} | backend={} | trained on {} rows at {}",
        model.target,
        model.backend.display_name(),
        model.n_train,
        model.trained_at.to_rfc3339(),
    );
    print!("{}", report::format_coefficients(&model));
    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        rows: args.rows,
        seed: args.seed,
        missing_rate: args.missing_rate,
        invalid_rate: args.invalid_rate,
    };
    let rows = write_sample(&config, &args.output, args.force)?;
    println!("Wrote {rows} synthetic rows to {}", args.output.display());
    Ok(())
}

/// Generate a synthetic survey into `path`; an existing file is kept unless `force`.
fn write_sample(config: &SampleConfig, path: &Path, force: bool) -> Result<usize, AppError> {
    if path.exists() && !force {
        return Err(AppError::InvalidConfig(format!(
            "'{}' already exists; pass --force to overwrite it",
            path.display()
        )));
    }
    let table = generate_survey(config)?;
    write_raw(&table, path)?;
    Ok(table.rows.len())
}

pub fn config_from_args(args: &PipelineArgs) -> PipelineConfig {
    PipelineConfig {
        raw_path: args.raw.clone(),
        clean_path: args.clean.clone(),
        model_path: args.model.clone(),
        contract: ColumnContract::default(),
        test_fraction: args.test_fraction,
        seed: args.seed,
        backend: args.backend,
        standardize: args.standardize,
        partitions: args.partitions,
        save_model: !args.no_save,
        strict_numeric: args.strict,
        head_rows: args.head,
    }
}

/// Rewrite argv so `phq9` defaults to `phq9 train`.
///
/// Rules:
/// - `phq9`                       -> `phq9 train`
/// - `phq9 --standardize ...`     -> `phq9 train --standardize ...`
/// - `phq9 --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("train".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "train".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BackendKind;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_trains() {
        assert_eq!(rewrite_args(argv(&["phq9"])), argv(&["phq9", "train"]));
    }

    #[test]
    fn leading_flags_go_to_train() {
        assert_eq!(
            rewrite_args(argv(&["phq9", "--backend", "parallel"])),
            argv(&["phq9", "train", "--backend", "parallel"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["phq9", "eda"])), argv(&["phq9", "eda"]));
        assert_eq!(rewrite_args(argv(&["phq9", "--help"])), argv(&["phq9", "--help"]));
    }

    #[test]
    fn default_flags_match_default_config() {
        let cli = crate::cli::Cli::parse_from(rewrite_args(argv(&["phq9"])));
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        let config = config_from_args(&args);
        let defaults = PipelineConfig::default();
        assert_eq!(config.raw_path, defaults.raw_path);
        assert_eq!(config.clean_path, defaults.clean_path);
        assert_eq!(config.model_path, defaults.model_path);
        assert_eq!(config.seed, defaults.seed);
        assert_eq!(config.test_fraction, defaults.test_fraction);
        assert_eq!(config.backend, BackendKind::Local);
        assert!(config.save_model);
        assert!(!config.standardize);
    }

    #[test]
    fn sample_defaults_away_from_the_raw_input() {
        let cli = crate::cli::Cli::parse_from(argv(&["phq9", "sample"]));
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_ne!(args.output, PipelineConfig::default().raw_path);
        assert!(!args.force);
    }

    #[test]
    fn sample_keeps_existing_file_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        std::fs::write(&path, "keep me\n").unwrap();
        let config = SampleConfig { rows: 10, ..SampleConfig::default() };

        assert!(matches!(
            write_sample(&config, &path, false),
            Err(AppError::InvalidConfig(_))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me\n");

        assert_eq!(write_sample(&config, &path, true).unwrap(), 10);
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("StudentID,"));
    }

    #[test]
    fn parses_parallel_options() {
        let cli = crate::cli::Cli::parse_from(argv(&[
            "phq9", "train", "-b", "parallel", "--partitions", "4", "--standardize", "--no-save",
        ]));
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        let config = config_from_args(&args);
        assert_eq!(config.backend, BackendKind::Parallel);
        assert_eq!(config.partitions, Some(4));
        assert!(config.standardize);
        assert!(!config.save_model);
    }
}
