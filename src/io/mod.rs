//! Input/output helpers.
//!
//! - CSV ingest + cleaning (`ingest`)
//! - cleaned table export (`export`)
//! - model artifact read/write (`model`)

pub mod export;
pub mod ingest;
pub mod model;

pub use export::*;
pub use ingest::*;
pub use model::*;
