//! Series data structure for daily interest observations.

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Unit in which forecast periods and cadence are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    /// One calendar day.
    #[default]
    Day,
}

impl PeriodUnit {
    /// Length of one period in days.
    pub fn days(self) -> i64 {
        match self {
            PeriodUnit::Day => 1,
        }
    }

    /// Length of one period as a duration.
    pub fn duration(self) -> Duration {
        Duration::days(self.days())
    }
}

/// A single dated interest value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// An ordered sequence of observations for one signal.
///
/// Dates are strictly increasing and every value is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Series {
    observations: Vec<Observation>,
    label: Option<String>,
}

impl Series {
    /// Create a series, validating ordering and values.
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        for (i, obs) in observations.iter().enumerate() {
            if !obs.value.is_finite() {
                return Err(ForecastError::malformed(Some(i), "value", "is not finite"));
            }
            if obs.value < 0.0 {
                return Err(ForecastError::malformed(Some(i), "value", "is negative"));
            }
        }

        if let Some(i) = observations
            .windows(2)
            .position(|w| w[1].date <= w[0].date)
        {
            return Err(ForecastError::InvalidParameter(format!(
                "dates must be strictly increasing ({} follows {})",
                observations[i + 1].date,
                observations[i].date
            )));
        }

        Ok(Self {
            observations,
            label: None,
        })
    }

    /// Create a series from parallel date and value vectors.
    pub fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "got {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        Self::new(
            dates
                .into_iter()
                .zip(values)
                .map(|(date, value)| Observation::new(date, value))
                .collect(),
        )
    }

    /// Create an empty series.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach a label (typically the value column name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Number of days between the first and last observation.
    pub fn span_days(&self) -> i64 {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        }
    }

    /// Infer the cadence from the median gap between consecutive dates.
    ///
    /// The median is rounded to a whole number of `unit` periods and is
    /// never less than one period.
    pub fn infer_cadence(&self, unit: PeriodUnit) -> Result<Duration> {
        if self.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let mut gaps: Vec<i64> = self
            .observations
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days())
            .collect();
        gaps.sort_unstable();

        let mid = gaps.len() / 2;
        let median_days = if gaps.len() % 2 == 0 {
            (gaps[mid - 1] + gaps[mid]) as f64 / 2.0
        } else {
            gaps[mid] as f64
        };

        let periods = (median_days / unit.days() as f64).round().max(1.0) as i64;
        Ok(Duration::days(periods * unit.days()))
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| date(2024, 1, 1) + Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn series_constructs_from_parts() {
        let series = Series::from_parts(daily(3), vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_label("YouTube");

        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_date(), Some(date(2024, 1, 1)));
        assert_eq!(series.last_date(), Some(date(2024, 1, 3)));
        assert_eq!(series.span_days(), 2);
        assert_eq!(series.label(), Some("YouTube"));
    }

    #[test]
    fn series_rejects_non_increasing_dates() {
        let dates = vec![date(2024, 1, 2), date(2024, 1, 1)];
        assert!(matches!(
            Series::from_parts(dates, vec![1.0, 2.0]),
            Err(ForecastError::InvalidParameter(_))
        ));

        let dates = vec![date(2024, 1, 1), date(2024, 1, 1)];
        assert!(Series::from_parts(dates, vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn series_rejects_bad_values() {
        let result = Series::from_parts(daily(2), vec![1.0, f64::NAN]);
        assert!(matches!(
            result,
            Err(ForecastError::MalformedInput { row: Some(1), .. })
        ));

        let result = Series::from_parts(daily(2), vec![-1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ForecastError::MalformedInput { row: Some(0), .. })
        ));
    }

    #[test]
    fn series_rejects_length_mismatch() {
        assert!(Series::from_parts(daily(3), vec![1.0]).is_err());
    }

    #[test]
    fn cadence_is_daily_for_consecutive_dates() {
        let series = Series::from_parts(daily(10), vec![1.0; 10]).unwrap();
        assert_eq!(
            series.infer_cadence(PeriodUnit::Day).unwrap(),
            Duration::days(1)
        );
    }

    #[test]
    fn cadence_uses_median_gap_for_sparse_series() {
        // Weekly samples with one missing week.
        let dates = vec![
            date(2024, 1, 7),
            date(2024, 1, 14),
            date(2024, 1, 21),
            date(2024, 2, 4),
            date(2024, 2, 11),
        ];
        let series = Series::from_parts(dates, vec![1.0; 5]).unwrap();
        assert_eq!(
            series.infer_cadence(PeriodUnit::Day).unwrap(),
            Duration::days(7)
        );
    }

    #[test]
    fn cadence_requires_two_observations() {
        let series = Series::from_parts(daily(1), vec![1.0]).unwrap();
        assert!(matches!(
            series.infer_cadence(PeriodUnit::Day),
            Err(ForecastError::InsufficientData { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn empty_series_has_zero_span() {
        let series = Series::empty();
        assert!(series.is_empty());
        assert_eq!(series.span_days(), 0);
        assert!(series.first_date().is_none());
    }
}
