//! TrailStop CLI: ATR trailing-stop signals for one pair or a whole dashboard.
//!
//! Commands:
//! - `signal`: evaluate the latest candle of one (symbol, interval) pair
//! - `rows`: print the per-candle indicator table for one pair
//! - `dashboard`: evaluate every configured (symbol, timeframe) pair in parallel

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trailstop_core::data::{
    fetch_or_empty, BinanceProvider, CandleProvider, CircuitBreaker, CsvProvider, DEFAULT_LIMIT,
};
use trailstop_core::{Interval, SignalEngine, SignalParams};
use trailstop_runner::{
    export_indicator_csv, export_json, export_rows_csv, render_text, write_json, Dashboard,
    DashboardConfig, DashboardReport, DashboardRow, ProviderKind,
};

#[derive(Parser)]
#[command(
    name = "trailstop",
    about = "TrailStop CLI: ATR trailing-stop Buy/Sell/Hold signals"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the latest candle of one pair.
    Signal {
        #[command(flatten)]
        pair: PairArgs,

        /// Print the result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the per-candle indicator table of one pair as CSV.
    Rows {
        #[command(flatten)]
        pair: PairArgs,
    },
    /// Evaluate every (symbol, timeframe) pair.
    Dashboard {
        /// Path to a TOML dashboard config. Defaults to the built-in dashboard.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured symbols.
        #[arg(long, num_args = 1..)]
        symbols: Option<Vec<String>>,

        /// Override the configured timeframes (1m, 15m, 1h, 1d).
        #[arg(long, num_args = 1..)]
        timeframes: Option<Vec<Interval>>,

        /// Read candles from <DIR>/<SYMBOL>_<interval>.csv instead of Binance.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Evaluate pairs one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the JSON report to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Args)]
struct PairArgs {
    /// Trading pair, e.g. BTCUSDT.
    #[arg(long)]
    symbol: String,

    /// Candle interval: 1m, 15m, 1h, 1d.
    #[arg(long, default_value = "1h")]
    interval: Interval,

    /// Number of most recent candles to fetch (>= 1).
    #[arg(
        long,
        default_value_t = DEFAULT_LIMIT,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    limit: usize,

    /// Trailing-stop volatility multiplier.
    #[arg(short = 'a', long, default_value_t = trailstop_core::params::DEFAULT_MULTIPLIER)]
    multiplier: f64,

    /// ATR window length in candles.
    #[arg(short = 'c', long, default_value_t = trailstop_core::params::DEFAULT_ATR_PERIOD)]
    atr_period: usize,

    /// Span of the confirming exponential smoothing.
    #[arg(long, default_value_t = trailstop_core::params::DEFAULT_SMOOTHING_SPAN)]
    smoothing_span: usize,

    /// Read candles from <DIR>/<SYMBOL>_<interval>.csv instead of Binance.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

impl PairArgs {
    fn params(&self) -> SignalParams {
        SignalParams::new(self.multiplier, self.atr_period).with_smoothing_span(self.smoothing_span)
    }

    fn provider(&self) -> Result<Box<dyn CandleProvider>> {
        let provider: Box<dyn CandleProvider> = match &self.csv_dir {
            Some(dir) => Box::new(CsvProvider::new(dir)),
            None => Box::new(BinanceProvider::new(Arc::new(
                CircuitBreaker::default_provider(),
            ))?),
        };
        Ok(provider)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Signal { pair, json } => run_signal(&pair, json),
        Commands::Rows { pair } => run_rows(&pair),
        Commands::Dashboard {
            config,
            symbols,
            timeframes,
            csv_dir,
            sequential,
            format,
            output,
        } => run_dashboard(config, symbols, timeframes, csv_dir, sequential, format, output),
    }
}

fn run_signal(pair: &PairArgs, json: bool) -> Result<()> {
    let engine = SignalEngine::new(pair.params())?;
    let provider = pair.provider()?;

    let outcome = fetch_or_empty(provider.as_ref(), &pair.symbol, pair.interval, pair.limit);
    if let Some(fault) = outcome.fault {
        bail!("failed to fetch {} ({}): {fault}", pair.symbol, pair.interval);
    }
    let result = engine.evaluate(&outcome.series)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let row = DashboardRow {
            symbol: pair.symbol.clone(),
            interval: pair.interval,
            candles: outcome.series.len(),
            result,
            error: None,
        };
        println!("{} {}", pair.symbol, trailstop_runner::export::format_row(&row));
    }
    Ok(())
}

fn run_rows(pair: &PairArgs) -> Result<()> {
    let engine = SignalEngine::new(pair.params())?;
    let provider = pair.provider()?;

    let series = provider
        .fetch(&pair.symbol, pair.interval, pair.limit)
        .with_context(|| format!("failed to fetch {} ({})", pair.symbol, pair.interval))?;
    let rows = engine.indicator_rows(&series)?;
    print!("{}", export_indicator_csv(&rows)?);
    Ok(())
}

fn run_dashboard(
    config_path: Option<PathBuf>,
    symbols: Option<Vec<String>>,
    timeframes: Option<Vec<Interval>>,
    csv_dir: Option<PathBuf>,
    sequential: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    // CLI flags override the file
    if let Some(symbols) = symbols {
        config.symbols = symbols;
    }
    if let Some(timeframes) = timeframes {
        config.timeframes = timeframes;
    }
    if let Some(dir) = csv_dir {
        config.provider.kind = ProviderKind::Csv;
        config.provider.csv_dir = Some(dir);
    }
    config.validate()?;

    tracing::debug!(
        symbols = config.symbols.len(),
        timeframes = config.timeframes.len(),
        provider = ?config.provider.kind,
        "starting dashboard"
    );
    let provider = config.provider.build()?;
    let dashboard = Dashboard::new(config)?.with_parallelism(!sequential);
    let report = dashboard.run(provider.as_ref());

    print_report(&report, format)?;

    if let Some(path) = output {
        write_json(&report, &path)?;
        eprintln!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn print_report(report: &DashboardReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report)),
        OutputFormat::Json => println!("{}", export_json(report)?),
        OutputFormat::Csv => print!("{}", export_rows_csv(&report.rows)?),
    }
    Ok(())
}
