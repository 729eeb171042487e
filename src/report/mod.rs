//! Reporting utilities: data overview, metrics and coefficient listings.

pub mod format;

pub use format::*;
