//! Forecaster trait defining the common interface for all models.

use crate::core::{ForecastResult, Series};
use crate::error::Result;

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to an observed series.
    fn fit(&mut self, series: &Series) -> Result<()>;

    /// Predict the fitted history followed by `horizon` future periods.
    fn predict(&self, horizon: usize) -> Result<ForecastResult>;

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use trendcast::core::PeriodUnit;
/// use trendcast::models::{AdditiveModel, BoxedForecaster};
/// use trendcast::EngineConfig;
///
/// let model: BoxedForecaster =
///     Box::new(AdditiveModel::new(EngineConfig::default(), PeriodUnit::Day));
/// assert_eq!(model.name(), "Additive");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedForecaster = Box<dyn Forecaster + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::core::PeriodUnit;
    use crate::models::AdditiveModel;
    use chrono::{Duration, NaiveDate};

    fn make_test_series(n: usize) -> Series {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..n).map(|i| start + Duration::days(i as i64)).collect();
        let values = (1..=n).map(|i| i as f64).collect();
        Series::from_parts(dates, values).unwrap()
    }

    fn boxed() -> BoxedForecaster {
        Box::new(AdditiveModel::new(
            EngineConfig::default().with_uncertainty_samples(0),
            PeriodUnit::Day,
        ))
    }

    #[test]
    fn test_boxed_forecaster_fit_predict() {
        let mut model = boxed();
        let ts = make_test_series(20);

        assert!(model.fit(&ts).is_ok());
        assert!(model.is_fitted());

        let forecast = model.predict(5).unwrap();
        assert_eq!(forecast.horizon(), 5);
        assert_eq!(forecast.len(), 25);
    }

    #[test]
    fn test_forecaster_trait_methods() {
        let mut model = boxed();
        let ts = make_test_series(20);

        // Before fit
        assert!(!model.is_fitted());
        assert!(model.fitted_values().is_none());
        assert!(model.residuals().is_none());

        // After fit
        model.fit(&ts).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.fitted_values().unwrap().len(), 20);
        assert_eq!(model.residuals().unwrap().len(), 20);
    }

    #[test]
    fn test_failed_fit_clears_previous_state() {
        let mut model = boxed();
        model.fit(&make_test_series(20)).unwrap();
        assert!(model.fit(&make_test_series(1)).is_err());
        assert!(!model.is_fitted());
    }
}
