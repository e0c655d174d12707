//! Price history loading from a directory of per-ticker CSV files.
//!
//! Each `<TICKER>.csv` must carry a header row with a date column and a price
//! column (names from [`DataConfig`]). Files are read in parallel on the rayon
//! pool; the output keeps the requested ticker order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::DataConfig;
use crate::error::{Error, Result};

/// One ticker's closing prices keyed by date, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub ticker: String,
    pub prices: BTreeMap<NaiveDate, f64>,
}

/// Tickers with a `.csv` file in `dir`, sorted by name.
pub fn list_tickers(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::DataDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut tickers = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| Error::DataDir {
                path: dir.to_path_buf(),
                source: e,
            })?
            .path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tickers.push(stem.to_string());
            }
        }
    }
    tickers.sort();
    Ok(tickers)
}

/// Resolve the ticker list from config: explicit tickers whose file exists,
/// or everything in the directory. `limit` applies last.
pub fn resolve_tickers(data: &DataConfig) -> Result<Vec<String>> {
    let mut tickers = match &data.tickers {
        Some(requested) => requested
            .iter()
            .filter(|t| {
                let exists = ticker_path(&data.dir, t).is_file();
                if !exists {
                    warn!("Skipping '{t}': no file in {}", data.dir.display());
                }
                exists
            })
            .cloned()
            .collect(),
        None => list_tickers(&data.dir)?,
    };
    if let Some(limit) = data.limit {
        tickers.truncate(limit);
    }
    Ok(tickers)
}

fn ticker_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{ticker}.csv"))
}

/// Load every ticker in parallel, applying the configured date window.
pub fn load_prices(data: &DataConfig, tickers: &[String]) -> Result<Vec<PriceSeries>> {
    info!(
        "Reading {} price files from {}",
        tickers.len(),
        data.dir.display()
    );
    let series: Vec<PriceSeries> = tickers
        .par_iter()
        .map(|t| load_one(&ticker_path(&data.dir, t), t, data))
        .collect::<Result<_>>()?;

    for s in &series {
        debug!("{}: {} rows in window", s.ticker, s.prices.len());
    }
    Ok(series)
}

fn load_one(path: &Path, ticker: &str, data: &DataConfig) -> Result<PriceSeries> {
    let read_err = |e: csv::Error| Error::DataRead {
        path: path.to_path_buf(),
        source: e,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_err)?;

    let headers = rdr.headers().map_err(read_err)?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            Error::Data(format!("{}: missing column '{name}'", path.display()))
        })
    };
    let date_idx = column(&data.date_column)?;
    let price_idx = column(&data.price_column)?;

    let mut prices = BTreeMap::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(read_err)?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let raw_price = record.get(price_idx).unwrap_or_default();
        if raw_price.is_empty() {
            continue;
        }

        let date = parse_date(raw_date).ok_or_else(|| {
            Error::Data(format!(
                "{}: bad date '{raw_date}' in row {}",
                path.display(),
                row + 1
            ))
        })?;
        if data.start_date.is_some_and(|start| date < start)
            || data.end_date.is_some_and(|end| date > end)
        {
            continue;
        }

        let price: f64 = raw_price.parse().map_err(|_| {
            Error::Data(format!(
                "{}: bad price '{raw_price}' in row {}",
                path.display(),
                row + 1
            ))
        })?;
        prices.insert(date, price);
    }

    Ok(PriceSeries {
        ticker: ticker.to_string(),
        prices,
    })
}

/// Accepts `YYYY-MM-DD` with an optional time suffix.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn config(dir: &Path) -> DataConfig {
        DataConfig {
            dir: dir.to_path_buf(),
            ..DataConfig::default()
        }
    }

    #[test]
    fn parse_date_variants() {
        assert_eq!(parse_date("2025-03-04"), NaiveDate::from_ymd_opt(2025, 3, 4));
        assert_eq!(
            parse_date("2025-03-04 09:15:00"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(parse_date("04/03/2025"), None);
        assert_eq!(parse_date("2025"), None);
    }

    #[test]
    fn lists_only_csv_files_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "ZZZ.csv", "time,close\n");
        write(tmp.path(), "AAA.csv", "time,close\n");
        write(tmp.path(), "notes.txt", "hello");
        assert_eq!(list_tickers(tmp.path()).unwrap(), vec!["AAA", "ZZZ"]);
    }

    #[test]
    fn missing_requested_ticker_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "AAA.csv", "time,close\n");
        let mut data = config(tmp.path());
        data.tickers = Some(vec!["AAA".into(), "NOPE".into()]);
        assert_eq!(resolve_tickers(&data).unwrap(), vec!["AAA"]);
    }

    #[test]
    fn limit_truncates() {
        let tmp = tempfile::tempdir().unwrap();
        for t in ["A", "B", "C"] {
            write(tmp.path(), &format!("{t}.csv"), "time,close\n");
        }
        let mut data = config(tmp.path());
        data.limit = Some(2);
        assert_eq!(resolve_tickers(&data).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn loads_with_date_window() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "AAA.csv",
            "time,open,close\n2024-12-31,1,10.0\n2025-01-02,1,11.0\n2025-01-03,1,\n2025-01-06,1,12.5\n",
        );
        let mut data = config(tmp.path());
        data.start_date = NaiveDate::from_ymd_opt(2025, 1, 1);
        let series = load_prices(&data, &["AAA".to_string()]).unwrap();

        assert_eq!(series.len(), 1);
        let prices: Vec<f64> = series[0].prices.values().copied().collect();
        assert_eq!(prices, vec![11.0, 12.5]);
    }

    #[test]
    fn missing_price_column() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "AAA.csv", "time,open\n2025-01-02,1\n");
        let err = load_prices(&config(tmp.path()), &["AAA".to_string()]).unwrap_err();
        assert!(err.to_string().contains("missing column 'close'"));
    }

    #[test]
    fn bad_price_reports_row() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "AAA.csv", "time,close\n2025-01-02,abc\n");
        let err = load_prices(&config(tmp.path()), &["AAA".to_string()]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn missing_directory() {
        let err = list_tickers(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::DataDir { .. }));
    }
}
