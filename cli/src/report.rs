//! Rendering allocations as text tables, JSON, and diagnostics dumps.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use hrpalloc::{Allocation, Dendrogram, Merge, WeightVector};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct WeightEntry<'a> {
    symbol: &'a str,
    weight: f64,
}

#[derive(Debug, Serialize)]
struct WeightReport<'a> {
    weights: Vec<WeightEntry<'a>>,
    sum: f64,
}

/// Weights as an aligned text table, in input order.
pub fn render_table(weights: &WeightVector) -> String {
    let mut lines = vec![
        "HRP WEIGHTS:".to_string(),
        format!("  {:>3}  {:10} {:>10}", "#", "Symbol", "Weight"),
    ];
    lines.extend(
        weights
            .iter()
            .enumerate()
            .map(|(i, (symbol, w))| format!("  {:>3}  {:10} {:>9.2}%", i + 1, symbol, w * 100.0)),
    );
    lines.push(String::new());
    lines.push(format!("  Sum: {:.6}", weights.sum()));
    lines.join("\n") + "\n"
}

/// Weights as pretty JSON: `{"weights": [{"symbol", "weight"}], "sum"}`.
pub fn render_json(weights: &WeightVector) -> Result<String> {
    let report = WeightReport {
        weights: weights
            .iter()
            .map(|(symbol, weight)| WeightEntry { symbol, weight })
            .collect(),
        sum: weights.sum(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Everything needed to plot the tree and the reordered correlation heatmap.
#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub generated_at: DateTime<Utc>,
    pub tickers: Vec<String>,
    pub ordered_tickers: Vec<String>,
    pub merges: Vec<Merge>,
    pub dendrogram: Dendrogram,
    /// Correlation rows in leaf order.
    pub seriated_correlation: Vec<Vec<f64>>,
    pub weights: Vec<(String, f64)>,
}

impl Diagnostics {
    pub fn from_allocation(allocation: &Allocation) -> Result<Self> {
        let seriated = allocation.seriated_correlation()?;
        let values = seriated.values();
        let seriated_correlation: Vec<Vec<f64>> = (0..values.nrows())
            .map(|i| values.row(i).iter().copied().collect())
            .collect();

        Ok(Self {
            generated_at: Utc::now(),
            tickers: allocation.correlation.labels().to_vec(),
            ordered_tickers: allocation
                .ordered_labels()
                .into_iter()
                .map(String::from)
                .collect(),
            merges: allocation.tree.merges().to_vec(),
            dendrogram: allocation.dendrogram()?,
            seriated_correlation,
            weights: allocation
                .weights
                .iter()
                .map(|(s, w)| (s.to_string(), w))
                .collect(),
        })
    }
}

/// Write the diagnostics dump as pretty JSON, creating parent directories.
pub fn write_diagnostics(path: &Path, allocation: &Allocation) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let diagnostics = Diagnostics::from_allocation(allocation)?;
    fs::write(path, serde_json::to_string_pretty(&diagnostics)?)?;
    Ok(())
}

/// Cluster structure summary: leaf order and the merge sequence.
pub fn render_inspect(allocation: &Allocation) -> String {
    let labels = allocation.correlation.labels();
    let tree = &allocation.tree;
    let name = |id: usize| {
        if tree.is_leaf(id) {
            labels[id].clone()
        } else {
            format!("#{}", id - tree.n_leaves())
        }
    };

    let mut lines = vec![
        "LEAF ORDER:".to_string(),
        format!("  {}", allocation.ordered_labels().join(" ")),
        String::new(),
        "MERGES:".to_string(),
        format!(
            "  {:>3}  {:10} {:10} {:>10} {:>5}",
            "#", "Left", "Right", "Distance", "Size"
        ),
    ];
    lines.extend(tree.merges().iter().enumerate().map(|(i, m)| {
        format!(
            "  {:>3}  {:10} {:10} {:>10.6} {:>5}",
            i,
            name(m.left),
            name(m.right),
            m.distance,
            m.size
        )
    }));
    lines.join("\n") + "\n"
}
