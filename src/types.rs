//! Core data model: return tables, labelled asset matrices, weight vectors.

use nalgebra::DMatrix;
use rustc_hash::FxHashSet;

use crate::error::{HrpError, Result};

// ---------------------------------------------------------------------------
// Return series
// ---------------------------------------------------------------------------

/// Per-asset return series aligned on a common temporal index.
///
/// Stored as an `observations x assets` matrix. Construction enforces:
/// - at least two assets, each with a unique non-empty identifier,
/// - at least two observations per series, all series the same length,
/// - every value finite.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnSeriesTable {
    labels: Vec<String>,
    data: DMatrix<f64>,
}

impl ReturnSeriesTable {
    /// Build a table from `(asset identifier, returns)` columns.
    ///
    /// Column order is preserved and becomes the order of the output weights.
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        if columns.len() < 2 {
            return Err(HrpError::NotEnoughAssets {
                found: columns.len(),
            });
        }

        let rows = columns[0].1.len();
        for (label, series) in &columns {
            if series.is_empty() {
                return Err(HrpError::InvalidInput(format!(
                    "series for '{label}' is empty"
                )));
            }
            if series.len() != rows {
                return Err(HrpError::InvalidInput(format!(
                    "series for '{label}' has {} observations, expected {rows}",
                    series.len()
                )));
            }
        }

        let data = DMatrix::from_fn(rows, columns.len(), |r, c| columns[c].1[r]);
        let labels = columns.into_iter().map(|(label, _)| label).collect();
        Self::from_matrix(labels, data)
    }

    /// Build a table from an `observations x assets` matrix and its column labels.
    pub fn from_matrix(labels: Vec<String>, data: DMatrix<f64>) -> Result<Self> {
        if labels.len() != data.ncols() {
            return Err(HrpError::ShapeMismatch(format!(
                "{} labels for {} return columns",
                labels.len(),
                data.ncols()
            )));
        }
        if labels.len() < 2 {
            return Err(HrpError::NotEnoughAssets {
                found: labels.len(),
            });
        }

        validate_labels(&labels)?;

        if data.nrows() < 2 {
            return Err(HrpError::InvalidInput(format!(
                "need at least 2 observations, got {}",
                data.nrows()
            )));
        }

        for (c, column) in data.column_iter().enumerate() {
            if let Some(r) = column.iter().position(|v| !v.is_finite()) {
                return Err(HrpError::InvalidInput(format!(
                    "non-finite return for '{}' at observation {r}",
                    labels[c]
                )));
            }
        }

        Ok(Self { labels, data })
    }

    /// Asset identifiers in column order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Raw `observations x assets` matrix.
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn n_assets(&self) -> usize {
        self.data.ncols()
    }

    pub fn n_observations(&self) -> usize {
        self.data.nrows()
    }
}

fn validate_labels(labels: &[String]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for label in labels {
        if label.is_empty() {
            return Err(HrpError::InvalidInput("empty asset identifier".into()));
        }
        if !seen.insert(label.as_str()) {
            return Err(HrpError::InvalidInput(format!(
                "duplicate asset identifier: {label}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Labelled square matrices
// ---------------------------------------------------------------------------

/// A square matrix indexed by asset identifier on both axes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AssetMatrix {
    labels: Vec<String>,
    values: DMatrix<f64>,
}

/// Pearson correlations; diagonal 1.0.
pub type CorrelationMatrix = AssetMatrix;
/// Sample covariances; diagonal holds per-asset variances.
pub type CovarianceMatrix = AssetMatrix;
/// Non-negative pairwise distances; diagonal 0.0.
pub type DistanceMatrix = AssetMatrix;

impl AssetMatrix {
    /// Wrap `values`, checking it is square and has one label per row.
    pub fn new(labels: Vec<String>, values: DMatrix<f64>) -> Result<Self> {
        if !values.is_square() {
            return Err(HrpError::ShapeMismatch(format!(
                "matrix is {}x{}, expected square",
                values.nrows(),
                values.ncols()
            )));
        }
        if labels.len() != values.nrows() {
            return Err(HrpError::ShapeMismatch(format!(
                "{} labels for a {n}x{n} matrix",
                labels.len(),
                n = values.nrows()
            )));
        }
        Ok(Self { labels, values })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Number of assets on each axis.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Entry at row `i`, column `j` (positional).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    /// Position of an asset identifier, if present.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Allocation weights keyed by asset identifier, in input column order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WeightVector {
    entries: Vec<(String, f64)>,
}

impl WeightVector {
    /// Pair each label with the weight at the same position.
    pub(crate) fn from_parts(labels: &[String], weights: &[f64]) -> Self {
        debug_assert_eq!(labels.len(), weights.len());
        Self {
            entries: labels.iter().cloned().zip(weights.iter().copied()).collect(),
        }
    }

    /// Weight for an asset identifier.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(l, w)| (l.as_str(), *w))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, w)| *w).collect()
    }

    /// Sum of all weights (1.0 within tolerance for a successful allocation).
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
