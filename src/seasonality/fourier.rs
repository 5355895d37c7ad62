//! Fourier-series seasonal components.

use crate::config::SeasonalityToggle;
use chrono::{Duration, NaiveDate};
use std::f64::consts::PI;

pub const WEEKLY_PERIOD_DAYS: f64 = 7.0;
pub const YEARLY_PERIOD_DAYS: f64 = 365.25;
pub const WEEKLY_DEFAULT_ORDER: usize = 3;
pub const YEARLY_DEFAULT_ORDER: usize = 10;

/// A periodic component expressed as `order` sine/cosine pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct FourierSeasonality {
    pub name: &'static str,
    pub period_days: f64,
    pub order: usize,
}

impl FourierSeasonality {
    pub fn weekly(order: usize) -> Self {
        Self {
            name: "weekly",
            period_days: WEEKLY_PERIOD_DAYS,
            order,
        }
    }

    pub fn yearly(order: usize) -> Self {
        Self {
            name: "yearly",
            period_days: YEARLY_PERIOD_DAYS,
            order,
        }
    }

    /// Number of design columns (`2 * order`).
    pub fn width(&self) -> usize {
        2 * self.order
    }

    /// Append `[sin(2πk·τ/P), cos(2πk·τ/P)]` for `k = 1..=order` to `out`,
    /// where `τ` is days since the Unix epoch.
    pub fn push_features(&self, date: NaiveDate, out: &mut Vec<f64>) {
        let tau = days_since_epoch(date);
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * tau / self.period_days;
            out.push(angle.sin());
            out.push(angle.cos());
        }
    }
}

fn days_since_epoch(date: NaiveDate) -> f64 {
    (date - NaiveDate::default()).num_days() as f64
}

/// Pick the seasonal components for a history with the given span and cadence.
///
/// Under `Auto`, weekly seasonality needs at least two weeks of history sampled
/// more often than weekly; yearly seasonality needs at least two years.
pub fn resolve_seasonalities(
    weekly: SeasonalityToggle,
    yearly: SeasonalityToggle,
    span: Duration,
    cadence: Duration,
) -> Vec<FourierSeasonality> {
    let mut active = Vec::new();

    let weekly_order = match weekly {
        SeasonalityToggle::Auto if span >= Duration::weeks(2) && cadence < Duration::weeks(1) => {
            Some(WEEKLY_DEFAULT_ORDER)
        }
        SeasonalityToggle::Order(order) => Some(order),
        _ => None,
    };
    if let Some(order) = weekly_order {
        active.push(FourierSeasonality::weekly(order));
    }

    let yearly_order = match yearly {
        SeasonalityToggle::Auto if span >= Duration::days(730) => Some(YEARLY_DEFAULT_ORDER),
        SeasonalityToggle::Order(order) => Some(order),
        _ => None,
    };
    if let Some(order) = yearly_order {
        active.push(FourierSeasonality::yearly(order));
    }

    active
}
