//! Additive decomposition forecasting.
//!
//! Piecewise-linear trend with automatic changepoints, Fourier seasonality,
//! and simulated confidence bands.

mod design;
mod model;
mod uncertainty;

pub use model::AdditiveModel;
