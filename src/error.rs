//! Error types for the allocation pipeline.

/// All failures the HRP pipeline can surface to a caller.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum HrpError {
    /// Matrix dimensions or labels are inconsistent.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Clustering needs at least two assets.
    #[error("not enough assets: need at least 2, got {found}")]
    NotEnoughAssets { found: usize },

    /// Non-finite values, empty series, mismatched lengths, bad labels.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The linkage tree violates its structural invariants.
    #[error("malformed linkage tree: {0}")]
    MalformedTree(String),

    /// Both halves of a bisection carry zero variance, so the split is 0/0.
    #[error("degenerate cluster: zero combined variance splitting {left} vs {right} assets")]
    DegenerateCluster { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, HrpError>;
