//! `phq9-risk` library crate.
//!
//! The binary (`phq9`) is a thin wrapper around this library so that:
//!
//! - cleaning, fitting and scoring are testable without spawning processes
//! - the backends can be reused outside the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
