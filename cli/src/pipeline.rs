//! End-to-end run: config in, allocation out.

use hrpalloc::{Allocation, HrpAllocator, ReturnSeriesTable};
use log::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::{loader, returns};

/// Load the configured tickers and turn their prices into a return table.
pub fn load_returns(config: &Config) -> Result<ReturnSeriesTable> {
    let tickers = loader::resolve_tickers(&config.data)?;
    if tickers.len() < 2 {
        return Err(Error::Data(format!(
            "need at least 2 tickers with data, found {} in {}",
            tickers.len(),
            config.data.dir.display()
        )));
    }

    let series = loader::load_prices(&config.data, &tickers)?;
    let aligned = returns::align(&series)?;
    info!(
        "{} common dates across {} tickers",
        aligned.dates.len(),
        aligned.tickers.len()
    );
    returns::log_returns(&aligned)
}

/// Run the full pipeline and write the diagnostics dump if one is configured.
pub fn run(config: &Config) -> Result<Allocation> {
    let table = load_returns(config)?;
    let allocator = HrpAllocator::new(config.allocation.clone())?;
    debug!("Allocator config: {:?}", allocator.config());
    let allocation = allocator.allocate_detailed(&table)?;
    info!(
        "Allocated {} assets, leaf order: {}",
        allocation.weights.len(),
        allocation.ordered_labels().join(" ")
    );

    if let Some(path) = &config.output.diagnostics {
        crate::report::write_diagnostics(path, &allocation)?;
        info!("Diagnostics written to {}", path.display());
    }
    Ok(allocation)
}
