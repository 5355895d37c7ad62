//! Forecast engine configuration.

use crate::core::PeriodUnit;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether a seasonal component is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityToggle {
    /// Decide from the span and cadence of the history.
    #[default]
    Auto,
    /// Never fit this component.
    Off,
    /// Always fit with the given Fourier order.
    Order(usize),
}

/// Settings for the additive forecast engine.
///
/// Every field has a default, so a JSON document only needs the keys it
/// overrides:
///
/// ```
/// use trendcast::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{"interval_width": 0.95, "seed": 7}"#).unwrap();
/// assert_eq!(config.interval_width, 0.95);
/// assert_eq!(config.horizon, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default number of future periods.
    pub horizon: usize,
    /// Unit the horizon and cadence are expressed in.
    pub period_unit: PeriodUnit,
    /// Central probability mass covered by the confidence band.
    pub interval_width: f64,
    /// Maximum number of potential trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    /// Scale of the Laplace prior on changepoint rate adjustments.
    pub changepoint_prior_scale: f64,
    /// Scale of the normal prior on Fourier coefficients.
    pub seasonality_prior_scale: f64,
    pub weekly_seasonality: SeasonalityToggle,
    pub yearly_seasonality: SeasonalityToggle,
    /// Number of simulated draws for the band; 0 uses a normal approximation.
    pub uncertainty_samples: usize,
    /// Seed for the band simulation.
    pub seed: u64,
    /// Iteration cap for the reweighted least-squares fit.
    pub max_iterations: usize,
    /// Largest parameter change accepted as converged.
    pub tolerance: f64,
    /// Wall-clock budget for the fit, checked again before band simulation
    /// begins; `None` disables the check.
    pub time_budget_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon: 30,
            period_unit: PeriodUnit::Day,
            interval_width: 0.8,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            weekly_seasonality: SeasonalityToggle::Auto,
            yearly_seasonality: SeasonalityToggle::Auto,
            uncertainty_samples: 1000,
            seed: 0,
            max_iterations: 500,
            tolerance: 1e-7,
            time_budget_ms: Some(10_000),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }

    pub fn with_changepoints(mut self, n_changepoints: usize) -> Self {
        self.n_changepoints = n_changepoints;
        self
    }

    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Self {
        self.changepoint_prior_scale = scale;
        self
    }

    pub fn with_weekly(mut self, toggle: SeasonalityToggle) -> Self {
        self.weekly_seasonality = toggle;
        self
    }

    pub fn with_yearly(mut self, toggle: SeasonalityToggle) -> Self {
        self.yearly_seasonality = toggle;
        self
    }

    pub fn with_uncertainty_samples(mut self, samples: usize) -> Self {
        self.uncertainty_samples = samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget_ms = budget.map(|d| d.as_millis() as u64);
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    /// Check every field against its admissible range.
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ForecastError::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        }

        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be positive".to_string(),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        positive("changepoint_prior_scale", self.changepoint_prior_scale)?;
        positive("seasonality_prior_scale", self.seasonality_prior_scale)?;
        positive("tolerance", self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        for (name, toggle) in [
            ("weekly_seasonality", self.weekly_seasonality),
            ("yearly_seasonality", self.yearly_seasonality),
        ] {
            if toggle == SeasonalityToggle::Order(0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{name} order must be positive"
                )));
            }
        }
        Ok(())
    }
}
