//! Confidence bands for the additive model.
//!
//! Each output date gets a deviation sample around its point estimate from
//! three sources: observation noise, uncertainty in the fitted coefficients,
//! and (past the end of the history) trend changes that were not observed
//! yet. New changepoints arrive at the historical rate with Laplace-distributed
//! slope changes scaled by the mean fitted delta.

use crate::utils::linalg::Cholesky;
use crate::utils::sampling::{laplace, poisson, standard_normal};
use crate::utils::stats::{central_interval, normal_critical_value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub(crate) struct BandSettings {
    pub width: f64,
    pub samples: usize,
    pub seed: u64,
    /// Expected changepoints per unit of scaled time.
    pub changepoint_rate: f64,
    /// Laplace scale for simulated slope changes.
    pub delta_scale: f64,
}

/// Band offsets `(lower, upper)` in scaled units, with `lower <= 0 <= upper`.
pub(crate) fn band_offsets(
    rows: &[Vec<f64>],
    times: &[f64],
    posterior: &Cholesky,
    sigma: f64,
    settings: &BandSettings,
) -> Vec<(f64, f64)> {
    let sd: Vec<f64> = rows
        .iter()
        .map(|row| sigma * (1.0 + posterior.inverse_quadratic_form(row)).sqrt())
        .collect();

    if settings.samples == 0 {
        let z = normal_critical_value(settings.width);
        return sd.iter().map(|s| (-z * s, z * s)).collect();
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let t_max = times.iter().copied().fold(1.0_f64, f64::max);
    let future_span = t_max - 1.0;
    let mut deviations = vec![Vec::with_capacity(settings.samples); rows.len()];
    let mut changes: Vec<(f64, f64)> = Vec::new();

    for _ in 0..settings.samples {
        changes.clear();
        if future_span > 0.0 && settings.changepoint_rate > 0.0 {
            let n_changes = poisson(&mut rng, settings.changepoint_rate * future_span);
            for _ in 0..n_changes {
                let at = 1.0 + rng.gen::<f64>() * future_span;
                changes.push((at, laplace(&mut rng, settings.delta_scale)));
            }
        }

        for (i, &t) in times.iter().enumerate() {
            let trend_shift: f64 = changes
                .iter()
                .filter(|(at, _)| *at < t)
                .map(|(at, delta)| delta * (t - at))
                .sum();
            deviations[i].push(trend_shift + sd[i] * standard_normal(&mut rng));
        }
    }

    deviations
        .iter_mut()
        .map(|sample| {
            let (lo, hi) = central_interval(sample, settings.width);
            (lo.min(0.0), hi.max(0.0))
        })
        .collect()
}
