//! Input data sources that are not read from disk.

pub mod sample;

pub use sample::*;
