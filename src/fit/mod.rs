//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - seeded train/test split
//! - optional feature standardization
//! - least-squares fit through a local or parallel backend
//! - held-out evaluation (RMSE, R², MAE)

pub mod backend;
pub mod evaluate;
pub mod scaler;
pub mod split;
pub mod trainer;

pub use backend::*;
pub use evaluate::*;
pub use scaler::*;
pub use split::*;
pub use trainer::*;
