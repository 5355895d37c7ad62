//! Stateless forecasting entry point.

use crate::config::EngineConfig;
use crate::core::{Components, ForecastResult, PeriodUnit, Series};
use crate::error::{ForecastError, Result};
use crate::models::{AdditiveModel, Forecaster};
use std::time::Instant;
use tracing::info;

/// A fitted model kept by callers that predict more than once.
pub type FittedModel = AdditiveModel;

/// Fits a fresh additive model per call from a validated configuration.
///
/// The engine holds no state besides its configuration, so a single engine
/// can be shared across threads.
///
/// # Example
/// ```
/// use trendcast::core::{PeriodUnit, Series};
/// use trendcast::ForecastEngine;
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
/// let dates: Vec<_> = (0..30).map(|i| start + Duration::days(i)).collect();
/// let values: Vec<_> = (0..30).map(|i| 40.0 + (i % 7) as f64).collect();
/// let series = Series::from_parts(dates, values).unwrap();
///
/// let engine = ForecastEngine::default();
/// let forecast = engine.forecast(&series, 14, PeriodUnit::Day).unwrap();
/// assert_eq!(forecast.len(), 44);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: EngineConfig,
}

impl ForecastEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fit `series` and forecast `horizon` periods of `unit` past its end.
    pub fn forecast(
        &self,
        series: &Series,
        horizon: usize,
        unit: PeriodUnit,
    ) -> Result<ForecastResult> {
        check_horizon(horizon)?;
        let started = Instant::now();
        let model = self.fit_with_unit(series, unit)?;
        self.check_budget(started)?;
        let forecast = model.predict(horizon)?;
        info!(
            history = forecast.history().len(),
            horizon,
            label = series.label().unwrap_or_default(),
            "forecast complete"
        );
        Ok(forecast)
    }

    /// Fit `series` using the configured period unit.
    pub fn fit(&self, series: &Series) -> Result<FittedModel> {
        self.fit_with_unit(series, self.config.period_unit)
    }

    /// Trend and seasonal breakdown of the forecast for `horizon` periods.
    pub fn components(
        &self,
        series: &Series,
        horizon: usize,
        unit: PeriodUnit,
    ) -> Result<Components> {
        check_horizon(horizon)?;
        let started = Instant::now();
        let model = self.fit_with_unit(series, unit)?;
        self.check_budget(started)?;
        model.components(horizon)
    }

    /// The budget is checked once more before band simulation starts; the
    /// simulation itself runs to completion.
    fn check_budget(&self, started: Instant) -> Result<()> {
        match self.config.time_budget() {
            Some(budget) if started.elapsed() >= budget => {
                Err(ForecastError::Timeout { budget })
            }
            _ => Ok(()),
        }
    }

    fn fit_with_unit(&self, series: &Series, unit: PeriodUnit) -> Result<FittedModel> {
        let mut model = AdditiveModel::new(self.config.clone(), unit);
        model.fit(series)?;
        Ok(model)
    }
}

fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon must be positive".to_string(),
        ));
    }
    Ok(())
}
