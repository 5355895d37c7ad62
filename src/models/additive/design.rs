//! Design matrix for the piecewise-linear trend plus Fourier seasonality.
//!
//! Column layout: `[1, t, (t - s_1)+, ..., (t - s_C)+, seasonal...]` where
//! `t` is time scaled to `[0, 1]` over the history and `s_j` are the
//! changepoints on the same scale.

use crate::seasonality::FourierSeasonality;
use chrono::{Duration, NaiveDate};
use std::ops::Range;

#[derive(Debug, Clone)]
pub(crate) struct Design {
    start: NaiveDate,
    span_days: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<FourierSeasonality>,
}

impl Design {
    /// Lay out changepoints uniformly (by index) over the first
    /// `changepoint_range` of `dates`, which must hold at least two strictly
    /// increasing dates.
    pub fn new(
        dates: &[NaiveDate],
        n_changepoints: usize,
        changepoint_range: f64,
        seasonalities: Vec<FourierSeasonality>,
    ) -> Self {
        let start = dates[0];
        let span_days = (dates[dates.len() - 1] - start).num_days() as f64;

        let hist_size = (dates.len() as f64 * changepoint_range).floor() as usize;
        let n_cp = n_changepoints.min(hist_size.saturating_sub(1));
        let changepoints = (1..=n_cp)
            .map(|j| {
                let idx = (j as f64 * (hist_size - 1) as f64 / n_cp as f64).round() as usize;
                (dates[idx] - start).num_days() as f64 / span_days
            })
            .collect();

        Self {
            start,
            span_days,
            changepoints,
            seasonalities,
        }
    }

    pub fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    pub fn changepoint_dates(&self) -> Vec<NaiveDate> {
        self.changepoints
            .iter()
            .map(|t| self.start + Duration::days((t * self.span_days).round() as i64))
            .collect()
    }

    pub fn seasonalities(&self) -> &[FourierSeasonality] {
        &self.seasonalities
    }

    pub fn n_columns(&self) -> usize {
        2 + self.changepoints.len()
            + self.seasonalities.iter().map(|s| s.width()).sum::<usize>()
    }

    /// Columns holding the offset, base slope and changepoint deltas.
    pub fn trend_columns(&self) -> Range<usize> {
        0..2 + self.changepoints.len()
    }

    /// Columns holding the changepoint deltas only.
    pub fn delta_columns(&self) -> Range<usize> {
        2..2 + self.changepoints.len()
    }

    /// Column range of each seasonal component, by name.
    pub fn seasonal_columns(&self) -> Vec<(&'static str, Range<usize>)> {
        let mut offset = self.trend_columns().end;
        self.seasonalities
            .iter()
            .map(|s| {
                let range = offset..offset + s.width();
                offset = range.end;
                (s.name, range)
            })
            .collect()
    }

    pub fn row(&self, date: NaiveDate) -> Vec<f64> {
        let t = self.scaled_time(date);
        let mut row = Vec::with_capacity(self.n_columns());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&s| (t - s).max(0.0)));
        for season in &self.seasonalities {
            season.push_features(date, &mut row);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn daily(n: usize) -> Vec<NaiveDate> {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| d0 + Duration::days(i as i64)).collect()
    }

    #[test]
    fn changepoints_cover_leading_history() {
        let dates = daily(101);
        let design = Design::new(&dates, 25, 0.8, vec![]);

        let cps = design.changepoints();
        assert_eq!(cps.len(), 25);
        assert!(cps.windows(2).all(|w| w[0] < w[1]));
        assert!(cps[0] > 0.0);
        assert!(*cps.last().unwrap() <= 0.8);
    }

    #[test]
    fn changepoint_count_shrinks_for_short_history() {
        let design = Design::new(&daily(10), 25, 0.8, vec![]);
        assert_eq!(design.changepoints().len(), 7);

        let design = Design::new(&daily(2), 25, 0.8, vec![]);
        assert!(design.changepoints().is_empty());
        assert_eq!(design.n_columns(), 2);
    }

    #[test]
    fn row_layout_matches_columns() {
        let dates = daily(30);
        let design = Design::new(&dates, 3, 0.8, vec![FourierSeasonality::weekly(2)]);

        assert_eq!(design.n_columns(), 2 + 3 + 4);
        assert_eq!(design.trend_columns(), 0..5);
        assert_eq!(design.delta_columns(), 2..5);
        assert_eq!(design.seasonal_columns(), vec![("weekly", 5..9)]);

        let first = design.row(dates[0]);
        assert_eq!(first.len(), design.n_columns());
        assert_eq!(first[0], 1.0);
        assert_eq!(first[1], 0.0);
        assert!(first[2..5].iter().all(|&h| h == 0.0));

        let last = design.row(dates[29]);
        assert_relative_eq!(last[1], 1.0);
        assert!(last[2..5].iter().all(|&h| h > 0.0));
    }

    #[test]
    fn time_extends_past_one_for_future_dates() {
        let dates = daily(11);
        let design = Design::new(&dates, 0, 0.8, vec![]);
        assert_relative_eq!(design.scaled_time(dates[10] + Duration::days(5)), 1.5);
    }

    #[test]
    fn changepoint_dates_round_trip() {
        let dates = daily(11);
        let design = Design::new(&dates, 4, 1.0, vec![]);
        for date in design.changepoint_dates() {
            assert!(dates.contains(&date));
        }
    }
}
