use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    common::{error::AppError, money::Money},
    domain::{
        ledger::Ledger,
        oracle::{FixedPriceOracle, PriceOracle},
    },
    io::{reader, writer},
    worker::processor::Processor,
};

#[derive(Parser, Debug)]
#[command(name = "trade_ledger", about = "Replay account operations against a trading ledger")]
pub struct Cli {
    /// Operations CSV: type,symbol,quantity,amount,timestamp
    pub operations: PathBuf,
    /// Seed deposit the account is opened with (profit/loss baseline)
    #[arg(long, value_parser = parse_money)]
    pub initial_deposit: Money,
    /// Price catalog CSV: symbol,price (defaults to the built-in catalog)
    #[arg(long)]
    pub prices: Option<PathBuf>,
    /// Timestamp of the seed deposit (defaults to now)
    #[arg(long, value_parser = reader::parse_timestamp)]
    pub opened_at: Option<DateTime<Utc>>,
    #[arg(long, value_enum, default_value_t = Report::History)]
    pub report: Report,
    /// History report: drop transactions dated before this timestamp
    #[arg(long, value_parser = reader::parse_timestamp)]
    pub since: Option<DateTime<Utc>>,
    /// History report: drop transactions dated after this timestamp
    #[arg(long, value_parser = reader::parse_timestamp)]
    pub until: Option<DateTime<Utc>>,
    /// Holdings and summary reports: replay up to this timestamp
    /// (defaults to the latest recorded one)
    #[arg(long, value_parser = reader::parse_timestamp)]
    pub as_of: Option<DateTime<Utc>>,
    /// Abort on the first rejected operation instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Report {
    History,
    Holdings,
    Summary,
}

fn parse_money(s: &str) -> Result<Money, String> {
    Money::from_str(s).map_err(|e| e.to_string())
}

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, AppError> {
    let file = std::fs::File::open(path)?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file))
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    let stdout = stdout();
    let writer = BufWriter::new(stdout.lock());
    run_with_output(cli, writer)
}

/// Same as [`run`], writing the report to `out` instead of stdout.
pub fn run_with_output<W: Write>(cli: Cli, out: W) -> Result<(), AppError> {
    let catalog = match &cli.prices {
        Some(path) => {
            let mut rdr = csv_reader(path)?;
            reader::read_prices(&mut rdr).map_err(AppError::Parse)?
        }
        None => FixedPriceOracle::default(),
    };
    tracing::info!(symbols = ?catalog.symbols(), "price catalog loaded");
    let oracle: Arc<dyn PriceOracle + Send + Sync> = Arc::new(catalog);

    let opened_at = cli.opened_at.unwrap_or_else(Utc::now);
    let mut ledger = Ledger::new_at(cli.initial_deposit, opened_at, oracle)?;
    let mut processor = Processor::new();

    tracing::info!(operations = %cli.operations.display(), "replaying operations");
    let mut rdr = csv_reader(&cli.operations)?;
    for event in reader::read_operations(&mut rdr) {
        let event = event.map_err(AppError::Parse)?;
        if let Err(err) = processor.process(&mut ledger, event) {
            if cli.strict {
                return Err(err.into());
            }
        }
    }
    tracing::info!(
        applied = processor.applied(),
        rejected = processor.rejected(),
        "replay finished"
    );

    match cli.report {
        Report::History => {
            writer::write_history(out, ledger.transaction_history(cli.since, cli.until))?
        }
        Report::Holdings => writer::write_holdings(out, &ledger, cli.as_of)?,
        Report::Summary => writer::write_summary(out, &ledger, cli.as_of)?,
    }
    Ok(())
}
