//! Dendrogram coordinates for external plotting.
//!
//! Uses scipy's `dendrogram` layout: leaf `k` of the order sits at
//! `x = 5 + 10 k`, each merge is drawn as a "U" whose legs rise from the
//! children's heights to the merge distance. Nothing is rendered here.

use crate::error::{HrpError, Result};
use crate::linkage::LinkageTree;
use crate::quasi_diag::LeafOrder;

/// Plot-ready description of a linkage tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dendrogram {
    /// x coordinates of each "U", one per merge record.
    pub icoord: Vec<[f64; 4]>,
    /// y coordinates of each "U", one per merge record.
    pub dcoord: Vec<[f64; 4]>,
    /// Leaf labels, left to right.
    pub ivl: Vec<String>,
    /// Leaf asset positions, left to right.
    pub leaves: Vec<usize>,
}

impl Dendrogram {
    /// Lay out `tree` with leaves in `order`, labelled from `labels`.
    pub fn from_tree(tree: &LinkageTree, order: &LeafOrder, labels: &[String]) -> Result<Self> {
        let n = tree.n_leaves();
        if order.len() != n || labels.len() != n {
            return Err(HrpError::ShapeMismatch(format!(
                "tree has {n} leaves, order {} and labels {}",
                order.len(),
                labels.len()
            )));
        }

        // x position of every cluster id, leaves first.
        let mut x = vec![0.0_f64; 2 * n - 1];
        for (pos, &leaf) in order.as_slice().iter().enumerate() {
            x[leaf] = 5.0 + 10.0 * pos as f64;
        }

        let mut icoord = Vec::with_capacity(n - 1);
        let mut dcoord = Vec::with_capacity(n - 1);
        for (i, m) in tree.merges().iter().enumerate() {
            let (xl, xr) = (x[m.left], x[m.right]);
            let (yl, yr) = (tree.height(m.left), tree.height(m.right));
            icoord.push([xl, xl, xr, xr]);
            dcoord.push([yl, m.distance, m.distance, yr]);
            x[n + i] = 0.5 * (xl + xr);
        }

        Ok(Self {
            icoord,
            dcoord,
            ivl: order.as_slice().iter().map(|&i| labels[i].clone()).collect(),
            leaves: order.as_slice().to_vec(),
        })
    }
}
