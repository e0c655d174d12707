//! Correlation-based distances used as clustering features.
//!
//! Two steps:
//! 1. `d0(i, j) = sqrt(0.5 * (1 - rho(i, j)))`, a metric in `[0, 1]`.
//! 2. `D(i, j) = || d0[.., i] - d0[.., j] ||_2`, the Euclidean distance between
//!    two assets' columns of `d0` ("distance of distances"). Two assets are close
//!    when they relate similarly to every other asset, not only to each other.

use nalgebra::DMatrix;

use crate::error::{HrpError, Result};
use crate::types::{AssetMatrix, CorrelationMatrix, DistanceMatrix};

/// Per-pair base distance `sqrt(0.5 * (1 - rho))`.
///
/// Correlations outside `[-1, 1]` by floating-point error are clamped first,
/// so the radicand is never negative.
pub fn base_distance(rho: f64) -> f64 {
    let rho = rho.clamp(-1.0, 1.0);
    (0.5 * (1.0 - rho)).max(0.0).sqrt()
}

/// Convert a correlation matrix into the distance-of-distances matrix.
pub fn correlation_distance(corr: &CorrelationMatrix) -> Result<DistanceMatrix> {
    let n = corr.len();
    if let Some(v) = corr.values().iter().find(|v| !v.is_finite()) {
        return Err(HrpError::InvalidInput(format!(
            "non-finite correlation value {v}"
        )));
    }

    let d0 = corr.values().map(base_distance);
    let rows = distance_rows(&d0);

    let mut dist = DMatrix::zeros(n, n);
    for (i, row) in rows.into_iter().enumerate() {
        for (j, v) in row.into_iter().enumerate() {
            dist[(i, j)] = v;
        }
    }

    AssetMatrix::new(corr.labels().to_vec(), dist)
}

/// Euclidean distance between columns `i` and `j` of `d0`.
fn column_distance(d0: &DMatrix<f64>, i: usize, j: usize) -> f64 {
    if i == j {
        return 0.0;
    }
    d0.column(i)
        .iter()
        .zip(d0.column(j).iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}

#[cfg(not(feature = "parallel"))]
fn distance_rows(d0: &DMatrix<f64>) -> Vec<Vec<f64>> {
    let n = d0.ncols();
    (0..n)
        .map(|i| (0..n).map(|j| column_distance(d0, i, j)).collect())
        .collect()
}

#[cfg(feature = "parallel")]
fn distance_rows(d0: &DMatrix<f64>) -> Vec<Vec<f64>> {
    use rayon::prelude::*;

    let n = d0.ncols();
    (0..n)
        .into_par_iter()
        .map(|i| (0..n).map(|j| column_distance(d0, i, j)).collect())
        .collect()
}
