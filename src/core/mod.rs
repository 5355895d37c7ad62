//! Core data structures for interest series and forecasts.

mod forecast;
mod time_series;

pub use forecast::{ComponentSeries, Components, ForecastPoint, ForecastResult};
pub use time_series::{Observation, PeriodUnit, Series};
