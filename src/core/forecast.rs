//! Forecast result structures.

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One row of the forecast table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastPoint {
    /// Width of the confidence band.
    pub fn width(&self) -> f64 {
        self.yhat_upper - self.yhat_lower
    }

    /// Whether `value` lies inside the band (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.yhat_lower && value <= self.yhat_upper
    }
}

/// In-sample fit followed by the forward extension.
///
/// The first `history_len` points cover the historical dates; the rest are
/// future dates spaced by `cadence`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
    #[serde(skip)]
    history_len: usize,
    #[serde(skip)]
    cadence: Duration,
}

impl ForecastResult {
    pub(crate) fn new(
        points: Vec<ForecastPoint>,
        history_len: usize,
        cadence: Duration,
    ) -> Result<Self> {
        if history_len > points.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "history length {} exceeds {} points",
                history_len,
                points.len()
            )));
        }
        if let Some(p) = points
            .iter()
            .find(|p| !p.contains(p.yhat))
        {
            return Err(ForecastError::InvalidParameter(format!(
                "band does not bracket estimate on {}",
                p.ds
            )));
        }
        Ok(Self {
            points,
            history_len,
            cadence,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points, history first.
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter()
    }

    /// In-sample fitted points.
    pub fn history(&self) -> &[ForecastPoint] {
        &self.points[..self.history_len]
    }

    /// Points beyond the last historical date.
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.history_len..]
    }

    /// Number of future points.
    pub fn horizon(&self) -> usize {
        self.points.len() - self.history_len
    }

    /// Spacing of the future points.
    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Point estimates in order.
    pub fn yhat(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.yhat).collect()
    }

    /// Render the table as a JSON array of `{ds, yhat, yhat_lower, yhat_upper}` records.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.points)?)
    }
}

impl<'a> IntoIterator for &'a ForecastResult {
    type Item = &'a ForecastPoint;
    type IntoIter = std::slice::Iter<'a, ForecastPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// A named additive component evaluated over a forecast's dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Breakdown of a fitted model into its additive parts.
///
/// Components are in the original value scale and sum (with the offset
/// folded into `trend`) to the point estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Components {
    pub dates: Vec<NaiveDate>,
    pub components: Vec<ComponentSeries>,
}

impl Components {
    /// Look up a component by name (`trend`, `weekly`, `yearly`, ...).
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }
}
