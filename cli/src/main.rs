//! CLI entry point for the HRP allocator.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use hrpalloc::DegeneratePolicy;
use hrpalloc_cli::config::{Config, OutputFormat};
use hrpalloc_cli::error::{Error, Result};
use hrpalloc_cli::{pipeline, report};

#[derive(Parser)]
#[command(name = "hrp")]
#[command(about = "Hierarchical Risk Parity weights from price CSV files")]
#[command(version)]
struct Cli {
    /// Path to config.toml (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of <TICKER>.csv files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Comma-separated tickers to load
    #[arg(long, global = true, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// First date to include (YYYY-MM-DD)
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    /// Print weights as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Write diagnostics JSON to this path
    #[arg(long, global = true)]
    diagnostics: Option<PathBuf>,

    /// Split 50/50 instead of failing when both halves have zero variance
    #[arg(long, global = true)]
    equal_split: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Compute and print HRP weights (default)
    Allocate,

    /// Print the leaf order and merge sequence
    Inspect,
}

impl Cli {
    /// Apply command-line overrides on top of the file config.
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.data.dir = dir.clone();
        }
        if let Some(tickers) = &self.tickers {
            config.data.tickers = Some(tickers.clone());
        }
        if self.start.is_some() {
            config.data.start_date = self.start;
        }
        if self.end.is_some() {
            config.data.end_date = self.end;
        }
        if self.json {
            config.output.format = OutputFormat::Json;
        }
        if let Some(path) = &self.diagnostics {
            config.output.diagnostics = Some(path.clone());
        }
        if self.equal_split {
            config.allocation.degenerate = DegeneratePolicy::EqualSplit;
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let allocation = pipeline::run(config)?;
    match cli.command.as_ref().unwrap_or(&Command::Allocate) {
        Command::Allocate => match config.output.format {
            OutputFormat::Table => print!("{}", report::render_table(&allocation.weights)),
            OutputFormat::Json => println!("{}", report::render_json(&allocation.weights)?),
        },
        Command::Inspect => print!("{}", report::render_inspect(&allocation)),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &config) {
        eprintln!("Error: {e}");
        match e {
            Error::Hrp(_) => process::exit(2),
            _ => process::exit(1),
        }
    }
}
