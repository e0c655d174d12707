//! Single-linkage agglomerative clustering.
//!
//! The tree is stored the scipy way: a flat list of `n - 1` merge records where
//! ids below `n` are leaves and id `n + i` is the cluster created by record `i`.
//!
//! # Tie-break
//!
//! When several cluster pairs share the minimum distance, the pair whose
//! `(smaller id, larger id)` is lexicographically lowest is merged first. Each
//! record stores its children as `(smaller id, larger id)`.

use crate::error::{HrpError, Result};
use crate::types::DistanceMatrix;

/// One agglomeration step.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    /// Number of leaves under the new cluster.
    pub size: usize,
}

/// A validated hierarchical clustering tree over `n_leaves` assets.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkageTree {
    n_leaves: usize,
    merges: Vec<Merge>,
    /// Leaf count per cluster id (leaves included).
    sizes: Vec<usize>,
}

impl LinkageTree {
    /// Build a tree from raw merge records, checking every structural invariant.
    ///
    /// Fails with `MalformedTree` on a wrong record count, a reference to a
    /// cluster not yet created, an id used twice, an invalid distance, or a
    /// member count that does not add up.
    pub fn from_merges(n_leaves: usize, merges: Vec<Merge>) -> Result<Self> {
        if n_leaves < 2 {
            return Err(HrpError::NotEnoughAssets { found: n_leaves });
        }
        if merges.len() != n_leaves - 1 {
            return Err(HrpError::MalformedTree(format!(
                "expected {} merge records for {n_leaves} leaves, got {}",
                n_leaves - 1,
                merges.len()
            )));
        }

        let total = 2 * n_leaves - 1;
        let mut sizes = vec![1usize; n_leaves];
        sizes.reserve(n_leaves - 1);
        let mut used = vec![false; total];

        for (i, m) in merges.iter().enumerate() {
            let id = n_leaves + i;
            for child in [m.left, m.right] {
                if child >= id {
                    return Err(HrpError::MalformedTree(format!(
                        "record {i} references cluster {child} before it exists"
                    )));
                }
                if used[child] {
                    return Err(HrpError::MalformedTree(format!(
                        "cluster {child} merged more than once"
                    )));
                }
                used[child] = true;
            }
            if m.left == m.right {
                return Err(HrpError::MalformedTree(format!(
                    "record {i} merges cluster {} with itself",
                    m.left
                )));
            }
            if !m.distance.is_finite() || m.distance < 0.0 {
                return Err(HrpError::MalformedTree(format!(
                    "record {i} has invalid distance {}",
                    m.distance
                )));
            }
            let size = sizes[m.left] + sizes[m.right];
            if m.size != size {
                return Err(HrpError::MalformedTree(format!(
                    "record {i} claims {} members, children hold {size}",
                    m.size
                )));
            }
            sizes.push(size);
        }

        Ok(Self {
            n_leaves,
            merges,
            sizes,
        })
    }

    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Id of the cluster holding every leaf.
    pub fn root(&self) -> usize {
        2 * self.n_leaves - 2
    }

    /// Ids below `n_leaves` are original assets.
    pub fn is_leaf(&self, id: usize) -> bool {
        id < self.n_leaves
    }

    /// Children of an internal cluster; `None` for leaves and unknown ids.
    pub fn children(&self, id: usize) -> Option<(usize, usize)> {
        if self.is_leaf(id) {
            return None;
        }
        self.merges
            .get(id - self.n_leaves)
            .map(|m| (m.left, m.right))
    }

    /// Merge distance of an internal cluster; `0.0` for leaves.
    pub fn height(&self, id: usize) -> f64 {
        if self.is_leaf(id) {
            return 0.0;
        }
        self.merges
            .get(id - self.n_leaves)
            .map_or(0.0, |m| m.distance)
    }

    /// Number of leaves under `id`.
    pub fn size(&self, id: usize) -> Option<usize> {
        self.sizes.get(id).copied()
    }

    /// Leaves under `id`, left subtree first.
    pub fn members(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.size(id).unwrap_or(0));
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            match self.children(c) {
                Some((l, r)) => {
                    stack.push(r);
                    stack.push(l);
                }
                None if self.is_leaf(c) => out.push(c),
                None => {}
            }
        }
        out
    }
}

/// Cluster `dist` with single linkage.
///
/// The matrix is symmetrised (`(D + D^T) / 2`) and its diagonal forced to zero
/// before use.
pub fn single_linkage(dist: &DistanceMatrix) -> Result<LinkageTree> {
    let n = dist.len();
    if n < 2 {
        return Err(HrpError::NotEnoughAssets { found: n });
    }

    let raw = dist.values();
    let mut d = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let v = 0.5 * (raw[(i, j)] + raw[(j, i)]);
            if !v.is_finite() || v < 0.0 {
                return Err(HrpError::InvalidInput(format!(
                    "invalid distance {v} between '{}' and '{}'",
                    dist.labels()[i],
                    dist.labels()[j]
                )));
            }
            d[i][j] = v;
        }
    }

    // Slot k holds cluster `ids[k]` while `active[k]`.
    let mut ids: Vec<usize> = (0..n).collect();
    let mut sizes = vec![1usize; n];
    let mut active = vec![true; n];
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..n - 1 {
        let mut best: Option<(f64, (usize, usize), usize, usize)> = None;
        for p in 0..n {
            if !active[p] {
                continue;
            }
            for q in (p + 1)..n {
                if !active[q] {
                    continue;
                }
                let dist_pq = d[p][q];
                let key = (ids[p].min(ids[q]), ids[p].max(ids[q]));
                let better = match best {
                    None => true,
                    Some((bd, bkey, _, _)) => dist_pq < bd || (dist_pq == bd && key < bkey),
                };
                if better {
                    best = Some((dist_pq, key, p, q));
                }
            }
        }

        let Some((distance, (left, right), p, q)) = best else {
            return Err(HrpError::MalformedTree(format!(
                "no active cluster pair at step {step}"
            )));
        };

        let size = sizes[p] + sizes[q];
        merges.push(Merge {
            left,
            right,
            distance,
            size,
        });

        // Single linkage: distance to the merged cluster is the closer of the two.
        for k in 0..n {
            if active[k] && k != p && k != q {
                let v = d[p][k].min(d[q][k]);
                d[p][k] = v;
                d[k][p] = v;
            }
        }
        active[q] = false;
        ids[p] = n + step;
        sizes[p] = size;
    }

    LinkageTree::from_merges(n, merges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetMatrix;
    use nalgebra::DMatrix;

    fn dist(values: &[f64], n: usize) -> DistanceMatrix {
        let labels = (0..n).map(|i| format!("A{i}")).collect();
        AssetMatrix::new(labels, DMatrix::from_row_slice(n, n, values)).unwrap()
    }

    fn merge(left: usize, right: usize, distance: f64, size: usize) -> Merge {
        Merge {
            left,
            right,
            distance,
            size,
        }
    }

    #[test]
    fn three_points() {
        #[rustfmt::skip]
        let d = dist(&[
            0.0, 1.0, 4.0,
            1.0, 0.0, 3.0,
            4.0, 3.0, 0.0,
        ], 3);
        let tree = single_linkage(&d).unwrap();
        assert_eq!(
            tree.merges(),
            &[merge(0, 1, 1.0, 2), merge(2, 3, 3.0, 3)]
        );
        assert_eq!(tree.root(), 4);
        assert_eq!(tree.children(4), Some((2, 3)));
        assert_eq!(tree.children(1), None);
    }

    #[test]
    fn chaining_uses_minimum_distance() {
        // Points on a line at 0, 1, 3, 6: single linkage chains left to right.
        #[rustfmt::skip]
        let d = dist(&[
            0.0, 1.0, 3.0, 6.0,
            1.0, 0.0, 2.0, 5.0,
            3.0, 2.0, 0.0, 3.0,
            6.0, 5.0, 3.0, 0.0,
        ], 4);
        let tree = single_linkage(&d).unwrap();
        assert_eq!(
            tree.merges(),
            &[merge(0, 1, 1.0, 2), merge(2, 4, 2.0, 3), merge(3, 5, 3.0, 4)]
        );
    }

    #[test]
    fn ties_merge_lowest_id_pair_first() {
        // All pairwise distances equal.
        #[rustfmt::skip]
        let d = dist(&[
            0.0, 1.0, 1.0, 1.0,
            1.0, 0.0, 1.0, 1.0,
            1.0, 1.0, 0.0, 1.0,
            1.0, 1.0, 1.0, 0.0,
        ], 4);
        let tree = single_linkage(&d).unwrap();
        assert_eq!(
            tree.merges(),
            &[merge(0, 1, 1.0, 2), merge(2, 3, 1.0, 2), merge(4, 5, 1.0, 4)]
        );
    }

    #[test]
    fn asymmetric_input_is_symmetrised() {
        #[rustfmt::skip]
        let d = dist(&[
            0.5, 1.0, 4.0,
            1.2, 0.0, 3.0,
            4.0, 3.0, 0.1,
        ], 3);
        let tree = single_linkage(&d).unwrap();
        assert!((tree.merges()[0].distance - 1.1).abs() < 1e-12);
        assert_eq!((tree.merges()[0].left, tree.merges()[0].right), (0, 1));
    }

    #[test]
    fn deterministic() {
        #[rustfmt::skip]
        let d = dist(&[
            0.0, 0.3, 0.3, 0.9,
            0.3, 0.0, 0.3, 0.9,
            0.3, 0.3, 0.0, 0.2,
            0.9, 0.9, 0.2, 0.0,
        ], 4);
        assert_eq!(single_linkage(&d).unwrap(), single_linkage(&d).unwrap());
    }

    #[test]
    fn single_asset_is_rejected() {
        let err = single_linkage(&dist(&[0.0], 1)).unwrap_err();
        assert_eq!(err, HrpError::NotEnoughAssets { found: 1 });
    }

    #[test]
    fn non_finite_distance_is_rejected() {
        let err = single_linkage(&dist(&[0.0, f64::NAN, f64::NAN, 0.0], 2)).unwrap_err();
        assert!(matches!(err, HrpError::InvalidInput(_)));
    }

    #[test]
    fn members_and_sizes() {
        let tree = LinkageTree::from_merges(
            4,
            vec![merge(1, 3, 0.1, 2), merge(0, 2, 0.2, 2), merge(4, 5, 0.5, 4)],
        )
        .unwrap();
        assert_eq!(tree.members(6), vec![1, 3, 0, 2]);
        assert_eq!(tree.size(4), Some(2));
        assert_eq!(tree.size(6), Some(4));
        assert_eq!(tree.height(5), 0.2);
        assert_eq!(tree.height(2), 0.0);
    }

    #[test]
    fn leaves_and_children() {
        let tree = LinkageTree::from_merges(
            3,
            vec![merge(0, 1, 0.1, 2), merge(2, 3, 0.4, 3)],
        )
        .unwrap();
        assert!(tree.is_leaf(2));
        assert!(!tree.is_leaf(3));
        assert_eq!(tree.children(2), None);
        assert_eq!(tree.children(4), Some((2, 3)));
        assert_eq!(tree.children(9), None);
    }

    #[test]
    fn from_merges_rejects_wrong_count() {
        let err = LinkageTree::from_merges(3, vec![merge(0, 1, 0.1, 2)]).unwrap_err();
        assert!(matches!(err, HrpError::MalformedTree(_)));
    }

    #[test]
    fn from_merges_rejects_forward_reference() {
        let err =
            LinkageTree::from_merges(3, vec![merge(0, 4, 0.1, 2), merge(1, 2, 0.2, 3)])
                .unwrap_err();
        assert!(matches!(err, HrpError::MalformedTree(_)));
    }

    #[test]
    fn from_merges_rejects_reused_cluster() {
        let err =
            LinkageTree::from_merges(3, vec![merge(0, 1, 0.1, 2), merge(1, 3, 0.2, 3)])
                .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn from_merges_rejects_bad_size() {
        let err =
            LinkageTree::from_merges(3, vec![merge(0, 1, 0.1, 2), merge(2, 3, 0.2, 4)])
                .unwrap_err();
        assert!(matches!(err, HrpError::MalformedTree(_)));
    }

    #[test]
    fn from_merges_rejects_negative_distance() {
        let err =
            LinkageTree::from_merges(2, vec![merge(0, 1, -0.1, 2)]).unwrap_err();
        assert!(matches!(err, HrpError::MalformedTree(_)));
    }
}
