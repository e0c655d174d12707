//! # hrpalloc
//!
//! Deterministic Hierarchical Risk Parity (HRP) portfolio allocation.
//!
//! Given a cross-section of asset return series, HRP clusters assets by how
//! their returns co-move, reorders them so clusters sit next to each other,
//! and splits unit weight top-down between halves in inverse proportion to
//! their variance. No covariance inversion is required.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Covariance / correlation | [`stats`] | [`CovarianceMatrix`], [`CorrelationMatrix`] |
//! | Distance of distances | [`distance`] | [`DistanceMatrix`] |
//! | Single linkage | [`linkage`] | [`LinkageTree`] |
//! | Quasi-diagonalisation | [`quasi_diag`] | [`LeafOrder`] |
//! | Recursive bisection | [`bisection`] | weights by asset position |
//! | Relabelling | [`HrpAllocator`] | [`WeightVector`] |
//!
//! ## Quick Start
//!
//! ```
//! use hrpalloc::{HrpAllocator, ReturnSeriesTable};
//!
//! let returns = ReturnSeriesTable::new(vec![
//!     ("AAA".to_string(), vec![0.010, -0.003, 0.007, 0.004, -0.002]),
//!     ("BBB".to_string(), vec![0.011, -0.002, 0.006, 0.005, -0.003]),
//!     ("CCC".to_string(), vec![-0.004, 0.002, 0.001, -0.001, 0.003]),
//! ])
//! .unwrap();
//!
//! let weights = HrpAllocator::default().allocate(&returns).unwrap();
//!
//! // Same assets, same order, summing to one.
//! assert_eq!(weights.labels().collect::<Vec<_>>(), vec!["AAA", "BBB", "CCC"]);
//! assert!((weights.sum() - 1.0).abs() < 1e-9);
//! ```
//!
//! ## Diagnostics
//!
//! [`HrpAllocator::allocate_detailed`] also returns the correlation matrix,
//! the tree, and the leaf order, from which the seriated correlation heatmap
//! and dendrogram coordinates can be derived:
//!
//! ```
//! use hrpalloc::{HrpAllocator, ReturnSeriesTable};
//!
//! let returns = ReturnSeriesTable::new(vec![
//!     ("AAA".to_string(), vec![0.010, -0.003, 0.007, 0.004]),
//!     ("BBB".to_string(), vec![0.002, 0.004, -0.001, 0.003]),
//! ])
//! .unwrap();
//!
//! let allocation = HrpAllocator::default().allocate_detailed(&returns).unwrap();
//! let dendrogram = allocation.dendrogram().unwrap();
//! assert_eq!(dendrogram.ivl.len(), 2);
//! ```
//!
//! ## Degenerate clusters
//!
//! When both halves of a bisection have zero variance the split is `0/0`.
//! The default [`DegeneratePolicy::Fail`] reports
//! [`HrpError::DegenerateCluster`]; [`DegeneratePolicy::EqualSplit`] splits
//! 50/50 instead. NaN weights never reach the caller.

mod allocator;
pub mod bisection;
mod config;
pub mod dendrogram;
pub mod distance;
mod error;
pub mod linkage;
pub mod quasi_diag;
pub mod stats;
mod types;

// Re-export public API
pub use allocator::{Allocation, HrpAllocator, allocate};
pub use config::{DegeneratePolicy, HrpConfig};
pub use dendrogram::Dendrogram;
pub use error::{HrpError, Result};
pub use linkage::{LinkageTree, Merge};
pub use quasi_diag::LeafOrder;
pub use types::{
    AssetMatrix, CorrelationMatrix, CovarianceMatrix, DistanceMatrix, ReturnSeriesTable,
    WeightVector,
};
