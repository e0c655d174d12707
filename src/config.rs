//! Allocation settings.

use crate::error::{HrpError, Result};

/// What to do when both halves of a bisection have zero variance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DegeneratePolicy {
    /// Report `HrpError::DegenerateCluster`.
    #[default]
    Fail,
    /// Split the parent weight 50/50 and log a warning.
    EqualSplit,
}

/// Configuration for [`HrpAllocator`](crate::HrpAllocator).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HrpConfig {
    pub degenerate: DegeneratePolicy,
    /// Upper bound on the number of assets accepted per call.
    ///
    /// Clustering is `O(N^3)`; callers with a computation budget bound N here.
    pub max_assets: Option<usize>,
}

impl HrpConfig {
    /// Validate the config. Returns `InvalidInput` if a field is nonsensical.
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_assets {
            if max < 2 {
                return Err(HrpError::InvalidInput(format!(
                    "max_assets must be >= 2, got {max}"
                )));
            }
        }
        Ok(())
    }

    pub fn with_degenerate(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    pub fn with_max_assets(mut self, max_assets: usize) -> Self {
        self.max_assets = Some(max_assets);
        self
    }
}
