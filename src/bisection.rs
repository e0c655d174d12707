//! Recursive bisection: split unit weight top-down by relative cluster variance.
//!
//! The leaf order is cut into contiguous halves (`left = [0, L/2)`,
//! `right = [L/2, L)`), level by level. For each pair of halves
//!
//! ```text
//! alpha = 1 - var(left) / (var(left) + var(right))
//! ```
//!
//! scales the left half's weights by `alpha` and the right half's by
//! `1 - alpha`, where `var` is the variance of the half's inverse-variance
//! portfolio. Singleton ranges are terminal.

use std::ops::Range;

use log::{debug, warn};

use crate::config::DegeneratePolicy;
use crate::error::{HrpError, Result};
use crate::quasi_diag::LeafOrder;
use crate::types::CovarianceMatrix;

/// Guard added to every variance before inversion.
pub const VARIANCE_EPSILON: f64 = 1e-8;

/// Inverse-variance weights `1 / (var_k + eps)` over `members`, normalised to one.
pub fn inverse_variance_weights(cov: &CovarianceMatrix, members: &[usize]) -> Vec<f64> {
    let inv: Vec<f64> = members
        .iter()
        .map(|&k| 1.0 / (cov.get(k, k) + VARIANCE_EPSILON))
        .collect();
    let total: f64 = inv.iter().sum();
    inv.into_iter().map(|x| x / total).collect()
}

/// Variance `w' S w` of the inverse-variance portfolio over `members`.
pub fn cluster_variance(cov: &CovarianceMatrix, members: &[usize]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let w = inverse_variance_weights(cov, members);
    let mut var = 0.0;
    for (a, &i) in members.iter().enumerate() {
        for (b, &j) in members.iter().enumerate() {
            var += w[a] * cov.get(i, j) * w[b];
        }
    }
    var.max(0.0)
}

/// Weights per asset position (indexed like `cov`, not like `order`).
pub fn recursive_bisection(
    cov: &CovarianceMatrix,
    order: &LeafOrder,
    policy: DegeneratePolicy,
) -> Result<Vec<f64>> {
    let n = cov.len();
    if order.len() != n {
        return Err(HrpError::ShapeMismatch(format!(
            "order of {} assets for a {n}x{n} covariance matrix",
            order.len()
        )));
    }
    if let Some(v) = cov.values().iter().find(|v| !v.is_finite()) {
        return Err(HrpError::InvalidInput(format!(
            "non-finite covariance value {v}"
        )));
    }
    if let Some(i) = (0..n).find(|&i| cov.get(i, i) < 0.0) {
        return Err(HrpError::InvalidInput(format!(
            "negative variance for '{}'",
            cov.labels()[i]
        )));
    }

    let idx = order.as_slice();
    let mut weights = vec![1.0_f64; n];
    let mut ranges: Vec<Range<usize>> = vec![0..n];
    let mut depth = 0;

    loop {
        let halves: Vec<Range<usize>> = ranges
            .iter()
            .filter(|r| r.len() > 1)
            .flat_map(|r| {
                let mid = r.start + r.len() / 2;
                [r.start..mid, mid..r.end]
            })
            .collect();
        if halves.is_empty() {
            break;
        }

        for pair in halves.chunks_exact(2) {
            let left = &idx[pair[0].clone()];
            let right = &idx[pair[1].clone()];
            let alpha = split_factor(cov, left, right, policy)?;

            for &a in left {
                weights[a] *= alpha;
            }
            for &a in right {
                weights[a] *= 1.0 - alpha;
            }
        }

        ranges = halves;
        depth += 1;
    }

    debug!("recursive bisection finished after {depth} levels over {n} assets");
    Ok(weights)
}

/// Share of the parent weight going to the left half.
fn split_factor(
    cov: &CovarianceMatrix,
    left: &[usize],
    right: &[usize],
    policy: DegeneratePolicy,
) -> Result<f64> {
    let left_var = cluster_variance(cov, left);
    let right_var = cluster_variance(cov, right);
    let total = left_var + right_var;

    if total > 0.0 {
        return Ok((1.0 - left_var / total).clamp(0.0, 1.0));
    }

    match policy {
        DegeneratePolicy::Fail => Err(HrpError::DegenerateCluster {
            left: left.len(),
            right: right.len(),
        }),
        DegeneratePolicy::EqualSplit => {
            warn!(
                "zero combined variance splitting {} vs {} assets, using 50/50",
                left.len(),
                right.len()
            );
            Ok(0.5)
        }
    }
}
