//! Binary logistic regression with an L2 penalty, fit by Newton's method.
//!
//! Objective: `0.5 * |w|^2 + C * sum(log_loss)`, intercept unpenalized.

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Inverse regularization strength
    pub c: f64,
    pub max_iter: usize,
    /// Stop when the largest Newton step component falls below this
    pub tol: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    /// Fit on rows `x` (all the same width) with boolean labels `y`.
    pub fn fit(x: &[Vec<f64>], y: &[bool], options: FitOptions) -> Result<Self> {
        if x.is_empty() {
            anyhow::bail!("cannot fit on an empty training set");
        }
        if x.len() != y.len() {
            anyhow::bail!("{} rows but {} labels", x.len(), y.len());
        }
        let d = x[0].len();
        if x.iter().any(|row| row.len() != d) {
            anyhow::bail!("training rows have differing widths");
        }
        if options.c <= 0.0 {
            anyhow::bail!("regularization strength C must be positive");
        }

        // theta[0] is the intercept, theta[1..] the coefficients.
        let n_params = d + 1;
        let mut theta = vec![0.0; n_params];
        let mut converged = false;

        for iteration in 0..options.max_iter {
            let mut grad = vec![0.0; n_params];
            let mut hess = vec![vec![0.0; n_params]; n_params];

            for j in 1..n_params {
                grad[j] = theta[j];
                hess[j][j] = 1.0;
            }

            for (row, &label) in x.iter().zip(y) {
                let z = theta[0] + dot(&theta[1..], row);
                let p = sigmoid(z);
                let residual = options.c * (p - f64::from(u8::from(label)));
                let weight = options.c * p * (1.0 - p);

                grad[0] += residual;
                hess[0][0] += weight;
                for j in 0..d {
                    grad[j + 1] += residual * row[j];
                    hess[0][j + 1] += weight * row[j];
                    for k in 0..d {
                        hess[j + 1][k + 1] += weight * row[j] * row[k];
                    }
                }
            }
            for j in 1..n_params {
                hess[j][0] = hess[0][j];
            }

            let step = solve(hess, grad)?;
            let largest = step.iter().fold(0.0f64, |m, s| m.max(s.abs()));
            for (t, s) in theta.iter_mut().zip(&step) {
                *t -= s;
            }

            if largest < options.tol {
                tracing::debug!("Logistic regression converged after {} iterations", iteration + 1);
                converged = true;
                break;
            }
        }
        if !converged {
            tracing::warn!(
                "Logistic regression did not converge in {} iterations",
                options.max_iter
            );
        }

        Ok(Self {
            intercept: theta[0],
            coefficients: theta[1..].to_vec(),
        })
    }

    /// Probability of the positive class.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.intercept + dot(&self.coefficients, row))
    }

    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) > 0.5
    }

    /// Fraction of rows whose predicted label matches `y`.
    pub fn accuracy(&self, x: &[Vec<f64>], y: &[bool]) -> f64 {
        if x.is_empty() {
            return 0.0;
        }
        let correct = x
            .iter()
            .zip(y)
            .filter(|(row, label)| self.predict(row) == **label)
            .count();
        correct as f64 / x.len() as f64
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            anyhow::bail!("singular system while fitting logistic regression");
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}
