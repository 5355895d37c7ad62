//! # trendcast
//!
//! Search-interest forecasting: normalize raw interest tables into daily
//! series, then fit an additive trend + seasonality model and forecast it
//! with confidence bands.
//!
//! ```
//! use trendcast::ingest::{normalize, RawTable};
//! use trendcast::core::PeriodUnit;
//! use trendcast::ForecastEngine;
//!
//! let json = (1..=28)
//!     .map(|d| format!(r#"{{"date": "2024-02-{d:02}", "YouTube": {}}}"#, 60 + d % 7))
//!     .collect::<Vec<_>>()
//!     .join(",");
//! let raw = RawTable::from_json_records(&format!("[{json}]")).unwrap();
//! let series = normalize(&raw, "date", "YouTube").unwrap();
//!
//! let forecast = ForecastEngine::default()
//!     .forecast(&series, 30, PeriodUnit::Day)
//!     .unwrap();
//! assert_eq!(forecast.future().len(), 30);
//! ```

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod seasonality;
pub mod source;
pub mod utils;

pub use config::{EngineConfig, SeasonalityToggle};
pub use engine::{FittedModel, ForecastEngine};
pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::{EngineConfig, SeasonalityToggle};
    pub use crate::core::{Components, ForecastPoint, ForecastResult, PeriodUnit, Series};
    pub use crate::engine::{FittedModel, ForecastEngine};
    pub use crate::error::{ForecastError, Result};
    pub use crate::ingest::{normalize, normalize_with, NormalizeOptions, RawTable};
    pub use crate::models::Forecaster;
    pub use crate::source::{forecast_interest, InterestQuery, InterestSource, StaticSource};
}
