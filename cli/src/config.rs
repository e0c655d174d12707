//! TOML configuration loading and validation.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hrpalloc::HrpConfig;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub allocation: HrpConfig,
    pub output: OutputConfig,
}

/// Where price histories live and which slice of them to use.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory of `<TICKER>.csv` files.
    pub dir: PathBuf,
    /// Tickers to load; every `*.csv` in `dir` when absent.
    pub tickers: Option<Vec<String>>,
    /// Keep at most this many tickers (after sorting when listing `dir`).
    pub limit: Option<usize>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub date_column: String,
    pub price_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data/stocks"),
            tickers: None,
            limit: None,
            start_date: None,
            end_date: None,
            date_column: default_date_column(),
            price_column: default_price_column(),
        }
    }
}

fn default_date_column() -> String {
    "time".into()
}
fn default_price_column() -> String {
    "close".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Optional path for the JSON diagnostics dump.
    pub diagnostics: Option<PathBuf>,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    pub fn validate(&self) -> Result<()> {
        let data = &self.data;
        if data.dir.as_os_str().is_empty() {
            return Err(Error::Config("data.dir must not be empty".into()));
        }
        if data.date_column.is_empty() || data.price_column.is_empty() {
            return Err(Error::Config(
                "data.date_column and data.price_column must not be empty".into(),
            ));
        }
        if let (Some(start), Some(end)) = (data.start_date, data.end_date) {
            if start > end {
                return Err(Error::Config(format!(
                    "data.start_date {start} is after data.end_date {end}"
                )));
            }
        }
        if data.limit == Some(0) {
            return Err(Error::Config("data.limit must be > 0".into()));
        }
        if let Some(tickers) = &data.tickers {
            let mut seen = FxHashSet::default();
            for t in tickers {
                if t.is_empty() {
                    return Err(Error::Config("empty ticker in data.tickers".into()));
                }
                if !seen.insert(t.as_str()) {
                    return Err(Error::Config(format!("duplicate ticker: {t}")));
                }
            }
        }
        self.allocation
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrpalloc::DegeneratePolicy;

    fn example_toml() -> &'static str {
        r#"
[data]
dir = "./data/stocks"
tickers = ["AAA", "ACB", "FPT"]
start_date = "2025-01-01"
end_date = "2025-12-31"
date_column = "time"
price_column = "close"

[allocation]
degenerate = "equal_split"
max_assets = 50

[output]
format = "json"
diagnostics = "hrp_diagnostics.json"
"#
    }

    #[test]
    fn parse_example_config() {
        let config = Config::from_toml(example_toml()).unwrap();
        assert_eq!(config.data.tickers.as_ref().unwrap().len(), 3);
        assert_eq!(
            config.data.start_date,
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(config.allocation.degenerate, DegeneratePolicy::EqualSplit);
        assert_eq!(config.allocation.max_assets, Some(50));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(
            config.output.diagnostics,
            Some(PathBuf::from("hrp_diagnostics.json"))
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.data.dir, PathBuf::from("./data/stocks"));
        assert_eq!(config.data.date_column, "time");
        assert_eq!(config.data.price_column, "close");
        assert_eq!(config.allocation.degenerate, DegeneratePolicy::Fail);
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn validate_catches_inverted_dates() {
        let toml = example_toml().replace("2025-12-31", "2024-12-31");
        assert!(matches!(Config::from_toml(&toml), Err(Error::Config(_))));
    }

    #[test]
    fn validate_catches_duplicate_tickers() {
        let toml = example_toml().replace("\"FPT\"", "\"AAA\"");
        assert!(Config::from_toml(&toml).is_err());
    }

    #[test]
    fn validate_catches_bad_max_assets() {
        let toml = example_toml().replace("max_assets = 50", "max_assets = 1");
        assert!(Config::from_toml(&toml).is_err());
    }

    #[test]
    fn unknown_degenerate_policy_is_a_parse_error() {
        let toml = example_toml().replace("equal_split", "coin_flip");
        assert!(matches!(Config::from_toml(&toml), Err(Error::ConfigParse(_))));
    }

    #[test]
    fn load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
