//! Sample covariance and Pearson correlation over a return table.
//!
//! Conventions follow pandas `DataFrame.cov()` / `DataFrame.corr()`:
//! the covariance uses the `n - 1` denominator and the correlation is the
//! covariance scaled by both standard deviations.
//!
//! Two deviations from pandas keep every downstream stage finite:
//! - correlations are clamped to `[-1, 1]` and the diagonal is exactly `1.0`,
//! - an asset with zero variance gets correlation `0.0` with every other asset
//!   (pandas yields `NaN`).

use nalgebra::DMatrix;

use crate::types::{AssetMatrix, CorrelationMatrix, CovarianceMatrix, ReturnSeriesTable};

/// Sample covariance matrix (`n - 1` denominator).
pub fn covariance(returns: &ReturnSeriesTable) -> CovarianceMatrix {
    let data = returns.data();
    let rows = data.nrows();
    let cols = data.ncols();

    // A constant column centres to exactly zero; the summed mean may not.
    let means: Vec<f64> = data
        .column_iter()
        .map(|c| {
            if c.iter().all(|v| *v == c[0]) {
                c[0]
            } else {
                c.sum() / rows as f64
            }
        })
        .collect();
    let mut centered = data.clone();
    for (j, mut column) in centered.column_iter_mut().enumerate() {
        column.add_scalar_mut(-means[j]);
    }

    let denom = (rows as f64 - 1.0).max(1.0);
    let mut cov = centered.transpose() * &centered / denom;

    // Force exact symmetry; the product can differ in the last ulp.
    for i in 0..cols {
        for j in (i + 1)..cols {
            let v = 0.5 * (cov[(i, j)] + cov[(j, i)]);
            cov[(i, j)] = v;
            cov[(j, i)] = v;
        }
    }

    wrap(returns.labels(), cov)
}

/// Pearson correlation derived from a covariance matrix.
pub fn correlation(cov: &CovarianceMatrix) -> CorrelationMatrix {
    let n = cov.len();
    let std: Vec<f64> = (0..n).map(|i| cov.get(i, i).max(0.0).sqrt()).collect();

    let corr = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            return 1.0;
        }
        let scale = std[i] * std[j];
        if scale > 0.0 {
            (cov.get(i, j) / scale).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    });

    wrap(cov.labels(), corr)
}

fn wrap(labels: &[String], values: DMatrix<f64>) -> AssetMatrix {
    // Shapes are square by construction.
    AssetMatrix::new(labels.to_vec(), values)
        .unwrap_or_else(|e| unreachable!("square matrix rejected: {e}"))
}
