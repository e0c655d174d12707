//! Error types for the command-line front end.

use std::path::PathBuf;

use hrpalloc::HrpError;

/// All errors that can occur while loading data and reporting an allocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to list data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    DataRead { path: PathBuf, source: csv::Error },

    #[error("data error: {0}")]
    Data(String),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("allocation failed: {0}")]
    Hrp(#[from] HrpError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
