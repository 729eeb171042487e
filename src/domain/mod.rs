//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the column contract shared by cleaning and modeling (`ColumnContract`)
//! - run configuration (`PipelineConfig`, `BackendKind`)
//! - cleaned data (`CleanTable`, `SurveyRecord`)
//! - fit outputs (`FittedModel`, `Evaluation`)

pub mod types;

pub use types::*;
