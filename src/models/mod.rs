//! Forecasting models.

mod traits;

pub mod additive;

pub use additive::AdditiveModel;
pub use traits::{BoxedForecaster, Forecaster};
