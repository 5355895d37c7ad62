//! Dense linear algebra for penalized least squares.
//!
//! The design matrices here are small (tens of columns), so plain
//! row-major `Vec<Vec<f64>>` storage and a Cholesky factorization are enough.

/// Lower-triangular Cholesky factor `L` of a symmetric positive definite `A`.
#[derive(Debug, Clone)]
pub struct Cholesky {
    l: Vec<Vec<f64>>,
}

impl Cholesky {
    /// Factor `A = L Lᵀ`. Returns `None` if `A` is not positive definite.
    pub fn decompose(a: &[Vec<f64>]) -> Option<Self> {
        let n = a.len();
        if n == 0 || a.iter().any(|row| row.len() != n) {
            return None;
        }

        let mut l = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..=i {
                let mut sum = a[i][j];
                for k in 0..j {
                    sum -= l[i][k] * l[j][k];
                }

                if i == j {
                    if sum <= 0.0 || !sum.is_finite() {
                        return None;
                    }
                    l[i][j] = sum.sqrt();
                } else {
                    l[i][j] = sum / l[j][j];
                }
            }
        }

        Some(Self { l })
    }

    pub fn dim(&self) -> usize {
        self.l.len()
    }

    /// Solve `L z = b`.
    fn forward(&self, b: &[f64]) -> Vec<f64> {
        let n = self.dim();
        let mut z = vec![0.0; n];
        for i in 0..n {
            let mut sum = b[i];
            for j in 0..i {
                sum -= self.l[i][j] * z[j];
            }
            z[i] = sum / self.l[i][i];
        }
        z
    }

    /// Solve `A x = b`.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.dim();
        let z = self.forward(b);

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = z[i];
            for j in (i + 1)..n {
                sum -= self.l[j][i] * x[j];
            }
            x[i] = sum / self.l[i][i];
        }
        x
    }

    /// Compute `xᵀ A⁻¹ x`.
    pub fn inverse_quadratic_form(&self, x: &[f64]) -> f64 {
        self.forward(x).iter().map(|z| z * z).sum()
    }
}

/// Solve a symmetric positive definite system `A x = b`.
pub fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    if a.len() != b.len() {
        return None;
    }
    Cholesky::decompose(a).map(|c| c.solve(b))
}

/// Gram matrix `XᵀX` for a row-major design matrix.
pub fn gram(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let p = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut xtx = vec![vec![0.0; p]; p];
    for row in rows {
        for i in 0..p {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            for j in 0..=i {
                xtx[i][j] += xi * row[j];
            }
        }
    }
    for i in 0..p {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }
    xtx
}

/// `Xᵀy` for a row-major design matrix.
pub fn cross(rows: &[Vec<f64>], y: &[f64]) -> Vec<f64> {
    let p = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut xty = vec![0.0; p];
    for (row, &yi) in rows.iter().zip(y) {
        for (acc, &xi) in xty.iter_mut().zip(row) {
            *acc += xi * yi;
        }
    }
    xty
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
