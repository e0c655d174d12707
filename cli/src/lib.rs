//! hrpalloc-cli: Hierarchical Risk Parity weights from a directory of price CSVs.
//!
//! Loads per-ticker closing prices in parallel, aligns them on common dates,
//! converts to log returns, and runs the `hrpalloc` allocator. Results print
//! as a table or JSON, with an optional diagnostics dump for plotting.

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod returns;
