//! Quasi-diagonalisation: reorder assets so every cluster is a contiguous run.

use nalgebra::DMatrix;

use crate::error::{HrpError, Result};
use crate::linkage::LinkageTree;
use crate::types::AssetMatrix;

/// A permutation of asset positions following the tree's leaf order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LeafOrder(Vec<usize>);

impl LeafOrder {
    /// Wrap `order`, checking it is a permutation of `0..order.len()`.
    pub fn new(order: Vec<usize>) -> Result<Self> {
        let n = order.len();
        let mut seen = vec![false; n];
        for &i in &order {
            if i >= n || seen[i] {
                return Err(HrpError::MalformedTree(format!(
                    "leaf order is not a permutation of 0..{n} (offending id {i})"
                )));
            }
            seen[i] = true;
        }
        Ok(Self(order))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of an asset within the order.
    pub fn position_of(&self, asset: usize) -> Option<usize> {
        self.0.iter().position(|&a| a == asset)
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

/// Expand the root's children in place until only leaves remain.
///
/// Starting from `[left(root), right(root)]`, every cluster id is replaced by
/// its two children, keeping sequence order. Any cluster formed during
/// linkage therefore ends up as a contiguous run of leaves.
pub fn quasi_diagonalize(tree: &LinkageTree) -> Result<LeafOrder> {
    let n = tree.n_leaves();
    let root = tree.root();
    let (left, right) = tree
        .children(root)
        .ok_or_else(|| HrpError::MalformedTree(format!("root cluster {root} has no record")))?;

    let mut order = vec![left, right];
    // Each pass expands every internal id; a tree of n leaves is at most n - 1 deep.
    let mut passes = 0;
    while order.iter().any(|&id| id >= n) {
        passes += 1;
        if passes > n {
            return Err(HrpError::MalformedTree(
                "cluster expansion did not terminate".into(),
            ));
        }

        let mut next = Vec::with_capacity(order.len() * 2);
        for id in order {
            if id < n {
                next.push(id);
                continue;
            }
            let (l, r) = tree.children(id).ok_or_else(|| {
                HrpError::MalformedTree(format!("dangling reference to cluster {id}"))
            })?;
            next.push(l);
            next.push(r);
        }
        order = next;
    }

    if order.len() != n {
        return Err(HrpError::MalformedTree(format!(
            "expansion produced {} leaves, expected {n}",
            order.len()
        )));
    }
    LeafOrder::new(order)
}

/// Permute rows and columns of `matrix` into leaf order.
pub fn seriate(matrix: &AssetMatrix, order: &LeafOrder) -> Result<AssetMatrix> {
    if order.len() != matrix.len() {
        return Err(HrpError::ShapeMismatch(format!(
            "order of {} assets for a {n}x{n} matrix",
            order.len(),
            n = matrix.len()
        )));
    }
    let idx = order.as_slice();
    let values = DMatrix::from_fn(idx.len(), idx.len(), |i, j| matrix.get(idx[i], idx[j]));
    let labels = idx.iter().map(|&i| matrix.labels()[i].clone()).collect();
    AssetMatrix::new(labels, values)
}
