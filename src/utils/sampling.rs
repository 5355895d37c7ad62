//! Seeded random draws used by uncertainty simulation.

use rand::Rng;

/// Standard normal draw via Box-Muller.
pub fn standard_normal(rng: &mut impl Rng) -> f64 {
    // gen::<f64>() is in [0, 1); shift to (0, 1] so ln() stays finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Laplace(0, `scale`) draw by inverse CDF.
pub fn laplace(rng: &mut impl Rng, scale: f64) -> f64 {
    let u: f64 = rng.gen::<f64>() - 0.5;
    let magnitude = -scale * (1.0 - 2.0 * u.abs()).max(f64::MIN_POSITIVE).ln();
    magnitude.copysign(u)
}

/// Poisson(`lambda`) draw.
///
/// Knuth's multiplication method for moderate rates, a rounded normal
/// approximation above that.
pub fn poisson(rng: &mut impl Rng, lambda: f64) -> usize {
    if !lambda.is_finite() || lambda <= 0.0 {
        return 0;
    }
    if lambda > 500.0 {
        let draw = lambda + lambda.sqrt() * standard_normal(rng);
        return draw.round().max(0.0) as usize;
    }

    let limit = (-lambda).exp();
    let mut count = 0;
    let mut product: f64 = rng.gen();
    while product > limit {
        count += 1;
        product *= rng.gen::<f64>();
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::stats::{mean, variance};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn normal_draws_have_unit_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let draws: Vec<f64> = (0..20_000).map(|_| standard_normal(&mut rng)).collect();
        assert!(mean(&draws).abs() < 0.05);
        assert!((variance(&draws) - 1.0).abs() < 0.05);
        assert!(draws.iter().all(|d| d.is_finite()));
    }

    #[test]
    fn laplace_draws_match_scale() {
        // Var(Laplace(0, b)) = 2b²
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<f64> = (0..20_000).map(|_| laplace(&mut rng, 0.5)).collect();
        assert!(mean(&draws).abs() < 0.05);
        assert!((variance(&draws) - 0.5).abs() < 0.05);
    }

    #[test]
    fn poisson_draws_match_rate() {
        let mut rng = StdRng::seed_from_u64(3);
        let draws: Vec<f64> = (0..10_000)
            .map(|_| poisson(&mut rng, 4.0) as f64)
            .collect();
        assert!((mean(&draws) - 4.0).abs() < 0.1);

        let large: Vec<f64> = (0..2_000)
            .map(|_| poisson(&mut rng, 900.0) as f64)
            .collect();
        assert!((mean(&large) - 900.0).abs() < 3.0);

        assert_eq!(poisson(&mut rng, 0.0), 0);
        assert_eq!(poisson(&mut rng, f64::NAN), 0);
    }

    #[test]
    fn draws_are_reproducible_for_a_seed() {
        let a: Vec<f64> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..8).map(|_| laplace(&mut rng, 1.0)).collect()
        };
        let b: Vec<f64> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..8).map(|_| laplace(&mut rng, 1.0)).collect()
        };
        assert_eq!(a, b);
    }
}
