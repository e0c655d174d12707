//! Allocation entry point: returns in, labelled weights out.

use log::debug;

use crate::bisection::recursive_bisection;
use crate::config::HrpConfig;
use crate::dendrogram::Dendrogram;
use crate::distance::correlation_distance;
use crate::error::{HrpError, Result};
use crate::linkage::{LinkageTree, single_linkage};
use crate::quasi_diag::{LeafOrder, quasi_diagonalize, seriate};
use crate::stats::{correlation, covariance};
use crate::types::{
    CorrelationMatrix, CovarianceMatrix, DistanceMatrix, ReturnSeriesTable, WeightVector,
};

/// Weights plus every intermediate the pipeline produced.
///
/// The intermediates are read-only copies; nothing here feeds back into the
/// weight computation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Allocation {
    pub weights: WeightVector,
    pub covariance: CovarianceMatrix,
    pub correlation: CorrelationMatrix,
    pub distance: DistanceMatrix,
    pub tree: LinkageTree,
    pub order: LeafOrder,
}

impl Allocation {
    /// Correlation matrix with rows and columns in leaf order.
    pub fn seriated_correlation(&self) -> Result<CorrelationMatrix> {
        seriate(&self.correlation, &self.order)
    }

    /// Dendrogram coordinates labelled with asset identifiers.
    pub fn dendrogram(&self) -> Result<Dendrogram> {
        Dendrogram::from_tree(&self.tree, &self.order, self.correlation.labels())
    }

    /// Asset identifiers in leaf order.
    pub fn ordered_labels(&self) -> Vec<&str> {
        self.order
            .as_slice()
            .iter()
            .map(|&i| self.correlation.labels()[i].as_str())
            .collect()
    }
}

/// Hierarchical Risk Parity allocator.
///
/// Holds only its configuration; every call works on fresh matrices, so one
/// allocator can be shared across threads.
///
/// # Example
///
/// ```
/// use hrpalloc::{HrpAllocator, ReturnSeriesTable};
///
/// let returns = ReturnSeriesTable::new(vec![
///     ("AAA".to_string(), vec![0.010, -0.004, 0.007, 0.002]),
///     ("BBB".to_string(), vec![0.012, -0.005, 0.006, 0.001]),
///     ("CCC".to_string(), vec![-0.003, 0.002, 0.001, -0.004]),
/// ])
/// .unwrap();
///
/// let weights = HrpAllocator::default().allocate(&returns).unwrap();
/// assert_eq!(weights.len(), 3);
/// assert!((weights.sum() - 1.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, Default)]
pub struct HrpAllocator {
    config: HrpConfig,
}

impl HrpAllocator {
    /// Create an allocator, validating `config`.
    pub fn new(config: HrpConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HrpConfig {
        &self.config
    }

    /// Compute HRP weights keyed by the table's asset identifiers, in column order.
    pub fn allocate(&self, returns: &ReturnSeriesTable) -> Result<WeightVector> {
        self.allocate_detailed(returns).map(|a| a.weights)
    }

    /// Compute weights and keep the intermediate matrices, tree, and order.
    pub fn allocate_detailed(&self, returns: &ReturnSeriesTable) -> Result<Allocation> {
        let n = returns.n_assets();
        if let Some(max) = self.config.max_assets {
            if n > max {
                return Err(HrpError::InvalidInput(format!(
                    "{n} assets exceeds max_assets = {max}"
                )));
            }
        }
        debug!(
            "allocating {n} assets over {} observations",
            returns.n_observations()
        );

        let cov = covariance(returns);
        let corr = correlation(&cov);
        let distance = correlation_distance(&corr)?;
        let tree = single_linkage(&distance)?;
        debug!(
            "linkage root distance {:.6}",
            tree.height(tree.root())
        );

        let order = quasi_diagonalize(&tree)?;
        debug!("leaf order {:?}", order.as_slice());

        let raw = recursive_bisection(&cov, &order, self.config.degenerate)?;
        if let Some(i) = raw.iter().position(|w| !w.is_finite()) {
            return Err(HrpError::InvalidInput(format!(
                "non-finite weight for '{}'",
                returns.labels()[i]
            )));
        }

        // `raw` is indexed by asset position, i.e. already in input column order.
        let weights = WeightVector::from_parts(returns.labels(), &raw);

        Ok(Allocation {
            weights,
            covariance: cov,
            correlation: corr,
            distance,
            tree,
            order,
        })
    }
}

/// Allocate with the default configuration.
pub fn allocate(returns: &ReturnSeriesTable) -> Result<WeightVector> {
    HrpAllocator::default().allocate(returns)
}
