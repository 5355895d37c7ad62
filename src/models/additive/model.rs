//! Additive trend + seasonality forecaster.

use super::design::Design;
use super::uncertainty::{band_offsets, BandSettings};
use crate::config::EngineConfig;
use crate::core::{
    ComponentSeries, Components, ForecastPoint, ForecastResult, PeriodUnit, Series,
};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::seasonality::resolve_seasonalities;
use crate::utils::linalg::{cross, dot, gram, Cholesky};
use crate::utils::stats::{mean_square, variance};
use chrono::{Duration, NaiveDate};
use std::time::Instant;
use tracing::{debug, info};

/// Prior scale for the offset and base slope.
const TREND_PRIOR_SCALE: f64 = 5.0;
/// Smallest noise variance on the scaled values.
const SIGMA2_FLOOR: f64 = 1e-10;
/// Keeps reweighting finite for deltas that shrink to zero.
const DELTA_EPS: f64 = 1e-6;

/// Additive decomposition model fitted by maximum a posteriori estimation.
///
/// `y(t) = g(t) + Σ s_k(t) + ε`, with `g` piecewise linear and each `s_k`
/// a Fourier series. Values are scaled by their absolute maximum and time by
/// the history span before fitting. The Laplace prior on changepoint deltas
/// makes the objective non-smooth, so the fit iterates reweighted ridge
/// solves until either the coefficients or the objective stop moving.
///
/// # Example
/// ```
/// use trendcast::core::{PeriodUnit, Series};
/// use trendcast::models::{AdditiveModel, Forecaster};
/// use trendcast::EngineConfig;
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let dates: Vec<_> = (0..40).map(|i| start + Duration::days(i)).collect();
/// let values: Vec<_> = (0..40).map(|i| 20.0 + 0.5 * i as f64).collect();
/// let series = Series::from_parts(dates, values).unwrap();
///
/// let mut model = AdditiveModel::new(EngineConfig::default(), PeriodUnit::Day);
/// model.fit(&series).unwrap();
/// let forecast = model.predict(7).unwrap();
/// assert_eq!(forecast.future().len(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    config: EngineConfig,
    unit: PeriodUnit,
    state: Option<FitState>,
}

#[derive(Debug, Clone)]
struct FitState {
    design: Design,
    beta: Vec<f64>,
    y_scale: f64,
    /// Residual standard deviation on the scaled values.
    sigma: f64,
    /// Factor of the penalized normal matrix; `σ² A⁻¹` is the coefficient covariance.
    posterior: Cholesky,
    dates: Vec<NaiveDate>,
    cadence: Duration,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
    iterations: usize,
}

impl AdditiveModel {
    pub fn new(config: EngineConfig, unit: PeriodUnit) -> Self {
        Self {
            config,
            unit,
            state: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of reweighting iterations used by the last fit.
    pub fn iterations(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.iterations)
    }

    /// Cadence inferred from the fitted history.
    pub fn cadence(&self) -> Option<Duration> {
        self.state.as_ref().map(|s| s.cadence)
    }

    /// Dates at which the trend may change slope.
    pub fn changepoint_dates(&self) -> Option<Vec<NaiveDate>> {
        self.state.as_ref().map(|s| s.design.changepoint_dates())
    }

    /// Fitted slope changes at each changepoint, in value units per day.
    pub fn changepoint_deltas(&self) -> Option<Vec<f64>> {
        self.state.as_ref().map(|s| {
            let per_day = s.y_scale / span_days(s);
            s.beta[s.design.delta_columns()]
                .iter()
                .map(|d| d * per_day)
                .collect()
        })
    }

    /// Resolve history and future dates for a forecast of `horizon` periods.
    fn output_dates(state: &FitState, horizon: usize) -> Result<Vec<NaiveDate>> {
        let out_of_range = || {
            ForecastError::InvalidParameter(format!(
                "horizon {horizon} at cadence {} days runs past the supported date range",
                state.cadence.num_days()
            ))
        };
        let steps = i32::try_from(horizon).map_err(|_| out_of_range())?;
        let last = state.dates[state.dates.len() - 1];

        let mut dates = state.dates.clone();
        for k in 1..=steps {
            let date = state
                .cadence
                .checked_mul(k)
                .and_then(|offset| last.checked_add_signed(offset))
                .ok_or_else(out_of_range)?;
            dates.push(date);
        }
        Ok(dates)
    }

    fn require_state(&self) -> Result<&FitState> {
        self.state.as_ref().ok_or(ForecastError::InvalidParameter(
            "model must be fitted before prediction".to_string(),
        ))
    }

    fn check_horizon(horizon: usize) -> Result<()> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Band offsets in value units for `dates`.
    fn bands(
        &self,
        state: &FitState,
        dates: &[NaiveDate],
        rows: &[Vec<f64>],
    ) -> Vec<(f64, f64)> {
        let times: Vec<f64> = dates.iter().map(|&d| state.design.scaled_time(d)).collect();
        let deltas = &state.beta[state.design.delta_columns()];
        let delta_scale = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64 + 1e-8
        };

        let settings = BandSettings {
            width: self.config.interval_width,
            samples: self.config.uncertainty_samples,
            seed: self.config.seed,
            changepoint_rate: deltas.len() as f64,
            delta_scale,
        };

        band_offsets(rows, &times, &state.posterior, state.sigma, &settings)
            .into_iter()
            .map(|(lo, hi)| (lo * state.y_scale, hi * state.y_scale))
            .collect()
    }

    /// Break the forecast for `horizon` periods into named components.
    ///
    /// `trend` carries the offset, so `trend + weekly + yearly == yhat`.
    /// `trend_lower`/`trend_upper` apply the forecast band to the trend.
    pub fn components(&self, horizon: usize) -> Result<Components> {
        Self::check_horizon(horizon)?;
        let state = self.require_state()?;
        let dates = Self::output_dates(state, horizon)?;
        let rows: Vec<Vec<f64>> = dates.iter().map(|&d| state.design.row(d)).collect();

        let partial = |range: std::ops::Range<usize>| -> Vec<f64> {
            rows.iter()
                .map(|row| state.y_scale * dot(&row[range.clone()], &state.beta[range.clone()]))
                .collect()
        };

        let trend = partial(state.design.trend_columns());
        let bands = self.bands(state, &dates, &rows);

        let trend_lower = trend.iter().zip(&bands).map(|(t, (lo, _))| t + lo).collect();
        let trend_upper = trend.iter().zip(&bands).map(|(t, (_, hi))| t + hi).collect();

        let mut components = vec![
            ComponentSeries {
                name: "trend".to_string(),
                values: trend,
            },
            ComponentSeries {
                name: "trend_lower".to_string(),
                values: trend_lower,
            },
            ComponentSeries {
                name: "trend_upper".to_string(),
                values: trend_upper,
            },
        ];
        for (name, range) in state.design.seasonal_columns() {
            components.push(ComponentSeries {
                name: name.to_string(),
                values: partial(range),
            });
        }

        Ok(Components { dates, components })
    }
}

fn span_days(state: &FitState) -> f64 {
    (state.dates[state.dates.len() - 1] - state.dates[0]).num_days() as f64
}

/// Prior precision (inverse variance) for each column, before scaling by σ².
fn prior_precision(design: &Design, config: &EngineConfig, beta: &[f64], first: bool) -> Vec<f64> {
    let mut precision = vec![1.0 / TREND_PRIOR_SCALE.powi(2); design.n_columns()];
    let tau = config.changepoint_prior_scale;
    for j in design.delta_columns() {
        precision[j] = if first {
            1.0 / (tau * tau)
        } else {
            1.0 / (tau * (beta[j].abs() + DELTA_EPS))
        };
    }
    let seasonal_precision = 1.0 / config.seasonality_prior_scale.powi(2);
    for (_, range) in design.seasonal_columns() {
        for j in range {
            precision[j] = seasonal_precision;
        }
    }
    precision
}

/// Negative log posterior (up to a constant) on the scaled problem.
fn objective(
    design: &Design,
    config: &EngineConfig,
    beta: &[f64],
    rss: f64,
    sigma2: f64,
    n: usize,
) -> f64 {
    let trend_prior = (beta[0].powi(2) + beta[1].powi(2)) / (2.0 * TREND_PRIOR_SCALE.powi(2));
    let delta_prior: f64 = beta[design.delta_columns()]
        .iter()
        .map(|d| d.abs() / config.changepoint_prior_scale)
        .sum();
    let seasonal_prior: f64 = design
        .seasonal_columns()
        .into_iter()
        .flat_map(|(_, range)| beta[range].to_vec())
        .map(|b| b * b / (2.0 * config.seasonality_prior_scale.powi(2)))
        .sum();
    0.5 * n as f64 * sigma2.ln() + rss / (2.0 * sigma2) + trend_prior + delta_prior + seasonal_prior
}

impl Forecaster for AdditiveModel {
    fn fit(&mut self, series: &Series) -> Result<()> {
        self.config.validate()?;
        self.state = None;

        let n = series.len();
        if n < 2 {
            return Err(ForecastError::InsufficientData { needed: 2, got: n });
        }

        let started = Instant::now();
        let budget = self.config.time_budget();
        let dates = series.dates();
        let values = series.values();
        let cadence = series.infer_cadence(self.unit)?;
        let span = dates[n - 1] - dates[0];

        let seasonalities = resolve_seasonalities(
            self.config.weekly_seasonality,
            self.config.yearly_seasonality,
            span,
            cadence,
        );
        let design = Design::new(
            &dates,
            self.config.n_changepoints,
            self.config.changepoint_range,
            seasonalities,
        );

        let y_scale = match values.iter().fold(0.0_f64, |m, v| m.max(v.abs())) {
            m if m > 0.0 => m,
            _ => 1.0,
        };
        let ys: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

        let rows: Vec<Vec<f64>> = dates.iter().map(|&d| design.row(d)).collect();
        let xtx = gram(&rows);
        let xty = cross(&rows, &ys);
        let p = design.n_columns();

        debug!(
            observations = n,
            columns = p,
            changepoints = design.changepoints().len(),
            seasonalities = ?design.seasonalities().iter().map(|s| s.name).collect::<Vec<_>>(),
            "fitting additive model"
        );

        let mut beta = vec![0.0; p];
        let mut sigma2 = variance(&ys).max(SIGMA2_FLOOR);
        let mut previous_objective = f64::INFINITY;
        let mut converged: Option<(usize, Cholesky, Vec<f64>)> = None;
        let mut last_change = f64::INFINITY;

        for iteration in 1..=self.config.max_iterations {
            if let Some(budget) = budget {
                if started.elapsed() >= budget {
                    return Err(ForecastError::Timeout { budget });
                }
            }

            let precision = prior_precision(&design, &self.config, &beta, iteration == 1);
            let mut a = xtx.clone();
            for j in 0..p {
                a[j][j] += sigma2 * precision[j];
            }

            let posterior = Cholesky::decompose(&a).ok_or_else(|| ForecastError::NonConvergence {
                iterations: iteration,
                reason: "penalized normal matrix is not positive definite".to_string(),
            })?;
            let next = posterior.solve(&xty);
            if next.iter().any(|b| !b.is_finite()) {
                return Err(ForecastError::NonConvergence {
                    iterations: iteration,
                    reason: "coefficients became non-finite".to_string(),
                });
            }

            let residuals: Vec<f64> = rows
                .iter()
                .zip(&ys)
                .map(|(row, y)| y - dot(row, &next))
                .collect();
            let rss = residuals.iter().map(|r| r * r).sum::<f64>();
            let next_sigma2 = mean_square(&residuals).max(SIGMA2_FLOOR);
            let current_objective = objective(&design, &self.config, &next, rss, next_sigma2, n);

            last_change = beta
                .iter()
                .zip(&next)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            let objective_change =
                (previous_objective - current_objective).abs() / (1.0 + current_objective.abs());

            beta = next;
            sigma2 = next_sigma2;
            previous_objective = current_objective;

            let tolerance = self.config.tolerance;
            if iteration > 1 && (last_change < tolerance || objective_change < tolerance) {
                converged = Some((iteration, posterior, residuals));
                break;
            }
        }

        let Some((iterations, posterior, residuals)) = converged else {
            return Err(ForecastError::NonConvergence {
                iterations: self.config.max_iterations,
                reason: format!(
                    "coefficient change {last_change:.3e} above tolerance {:.3e}",
                    self.config.tolerance
                ),
            });
        };

        let fitted: Vec<f64> = rows.iter().map(|row| y_scale * dot(row, &beta)).collect();
        let residuals: Vec<f64> = residuals.iter().map(|r| r * y_scale).collect();

        info!(
            iterations,
            sigma = sigma2.sqrt() * y_scale,
            cadence_days = cadence.num_days(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "additive model fitted"
        );

        self.state = Some(FitState {
            design,
            beta,
            y_scale,
            sigma: sigma2.sqrt(),
            posterior,
            dates,
            cadence,
            fitted,
            residuals,
            iterations,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<ForecastResult> {
        Self::check_horizon(horizon)?;
        let state = self.require_state()?;
        let dates = Self::output_dates(state, horizon)?;
        let rows: Vec<Vec<f64>> = dates.iter().map(|&d| state.design.row(d)).collect();
        let bands = self.bands(state, &dates, &rows);

        let points = dates
            .iter()
            .zip(&rows)
            .zip(bands)
            .map(|((&ds, row), (lo, hi))| {
                let yhat = state.y_scale * dot(row, &state.beta);
                ForecastPoint {
                    ds,
                    yhat,
                    yhat_lower: yhat + lo,
                    yhat_upper: yhat + hi,
                }
            })
            .collect();

        ForecastResult::new(points, state.dates.len(), state.cadence)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.residuals.as_slice())
    }

    fn name(&self) -> &str {
        "Additive"
    }
}
