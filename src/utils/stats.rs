//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal critical value for a central interval of `width`.
///
/// # Example
/// ```
/// use trendcast::utils::stats::normal_critical_value;
///
/// let z = normal_critical_value(0.95);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn normal_critical_value(width: f64) -> f64 {
    let width = width.clamp(1e-9, 1.0 - 1e-9);
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(0.5 + width / 2.0),
        Err(_) => f64::NAN,
    }
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of squared values.
pub fn mean_square(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Quantile of an ascending-sorted slice with linear interpolation.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Sort a sample in place and return the `(lower, upper)` quantiles of its
/// central `width` interval.
pub fn central_interval(sample: &mut [f64], width: f64) -> (f64, f64) {
    sample.sort_by(|a, b| a.total_cmp(b));
    let tail = (1.0 - width) / 2.0;
    (
        quantile_sorted(sample, tail),
        quantile_sorted(sample, 1.0 - tail),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn critical_values_match_tables() {
        assert_relative_eq!(normal_critical_value(0.8), 1.2816, epsilon = 1e-3);
        assert_relative_eq!(normal_critical_value(0.95), 1.96, epsilon = 1e-3);
    }

    #[test]
    fn basic_moments() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(mean(&v), 2.5);
        assert_relative_eq!(mean_square(&v), 7.5);
        assert_relative_eq!(variance(&v), 5.0 / 3.0, epsilon = 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(variance(&[1.0]).is_nan());
    }

    #[test]
    fn quantiles_interpolate() {
        let sorted = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_relative_eq!(quantile_sorted(&sorted, 0.0), 0.0);
        assert_relative_eq!(quantile_sorted(&sorted, 0.5), 20.0);
        assert_relative_eq!(quantile_sorted(&sorted, 0.1), 4.0, epsilon = 1e-12);
        assert_relative_eq!(quantile_sorted(&sorted, 1.0), 40.0);
    }

    #[test]
    fn central_interval_sorts_sample() {
        let mut sample = vec![40.0, 0.0, 30.0, 10.0, 20.0];
        let (lo, hi) = central_interval(&mut sample, 0.8);
        assert_relative_eq!(lo, 4.0, epsilon = 1e-12);
        assert_relative_eq!(hi, 36.0, epsilon = 1e-12);
        assert_eq!(sample, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    }
}
