//! Price alignment and log-return construction.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use hrpalloc::ReturnSeriesTable;
use log::{info, warn};

use crate::error::{Error, Result};
use crate::loader::PriceSeries;

/// Prices on the dates every ticker traded, one row per date.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPrices {
    pub tickers: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// `rows[t][k]` is the price of `tickers[k]` on `dates[t]`.
    pub rows: Vec<Vec<f64>>,
}

/// Inner-join the series on date. Rows where any price is non-positive or
/// non-finite are dropped so the log return is defined.
pub fn align(series: &[PriceSeries]) -> Result<AlignedPrices> {
    let Some((first, rest)) = series.split_first() else {
        return Err(Error::Data("no price series loaded".into()));
    };

    let mut joined: BTreeMap<NaiveDate, Vec<f64>> = first
        .prices
        .iter()
        .map(|(d, p)| (*d, vec![*p]))
        .collect();
    for s in rest {
        joined.retain(|date, row| match s.prices.get(date) {
            Some(p) => {
                row.push(*p);
                true
            }
            None => false,
        });
    }

    let before = joined.len();
    joined.retain(|_, row| row.iter().all(|p| p.is_finite() && *p > 0.0));
    if joined.len() < before {
        warn!(
            "Dropped {} dates with non-positive prices",
            before - joined.len()
        );
    }

    let (dates, rows): (Vec<NaiveDate>, Vec<Vec<f64>>) = joined.into_iter().unzip();
    Ok(AlignedPrices {
        tickers: series.iter().map(|s| s.ticker.clone()).collect(),
        dates,
        rows,
    })
}

/// Log returns `ln(p_t / p_{t-1})` per ticker, as a return table.
pub fn log_returns(prices: &AlignedPrices) -> Result<ReturnSeriesTable> {
    if prices.rows.len() < 3 {
        return Err(Error::Data(format!(
            "need at least 3 common dates, found {}",
            prices.rows.len()
        )));
    }

    let mut columns: Vec<(String, Vec<f64>)> = prices
        .tickers
        .iter()
        .map(|t| (t.clone(), Vec::with_capacity(prices.rows.len() - 1)))
        .collect();

    let mut skipped = 0usize;
    for pair in prices.rows.windows(2) {
        let step: Vec<f64> = pair[0]
            .iter()
            .zip(&pair[1])
            .map(|(prev, next)| (next / prev).ln())
            .collect();
        if step.iter().any(|r| !r.is_finite()) {
            skipped += 1;
            continue;
        }
        for (col, r) in columns.iter_mut().zip(step) {
            col.1.push(r);
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} non-finite return rows");
    }

    let observations = columns.first().map_or(0, |c| c.1.len());
    if observations < 2 {
        return Err(Error::Data(format!(
            "need at least 2 finite return rows, found {observations}"
        )));
    }

    info!(
        "Built {observations} return observations for {} tickers ({} to {})",
        columns.len(),
        prices.dates[0],
        prices.dates[prices.dates.len() - 1]
    );
    Ok(ReturnSeriesTable::new(columns)?)
}
