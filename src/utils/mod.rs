//! Numeric utilities shared by the forecasting models.

pub mod linalg;
pub mod sampling;
pub mod stats;

pub use linalg::{solve_symmetric, Cholesky};
pub use stats::normal_critical_value;
