//! Reporting and export: text, JSON, and CSV.
//!
//! - **Text**: the dashboard view, one block per symbol, one line per timeframe
//! - **JSON**: full report serialization with schema versioning
//! - **CSV**: dashboard rows, and the per-candle indicator table
//!
//! The text view keeps three presentation cases visually distinct: no data,
//! Hold (no price), and Buy/Sell (price and time).

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trailstop_core::{IndicatorRow, Signal, SignalResult};

use crate::dashboard::{DashboardReport, DashboardRow};

/// Current schema version for exported reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Presentation status of a `SignalResult`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowStatus {
    NoData,
    Hold { timestamp: DateTime<Utc> },
    Buy { price: f64, timestamp: DateTime<Utc> },
    Sell { price: f64, timestamp: DateTime<Utc> },
}

impl RowStatus {
    pub fn from_result(result: &SignalResult) -> Self {
        match (result.signal, result.price, result.timestamp) {
            (Some(Signal::Buy), Some(price), Some(timestamp)) => RowStatus::Buy { price, timestamp },
            (Some(Signal::Sell), Some(price), Some(timestamp)) => {
                RowStatus::Sell { price, timestamp }
            }
            (Some(_), _, Some(timestamp)) => RowStatus::Hold { timestamp },
            _ => RowStatus::NoData,
        }
    }
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a single timeframe line.
pub fn format_row(row: &DashboardRow) -> String {
    let tf = row.interval;
    let mut line = match RowStatus::from_result(&row.result) {
        RowStatus::NoData => format!("Timeframe: {tf} | No data."),
        RowStatus::Hold { timestamp } => {
            format!("Timeframe: {tf} | Signal: Hold | Time: {}", format_time(timestamp))
        }
        RowStatus::Buy { price, timestamp } => format!(
            "Timeframe: {tf} | Signal: Buy | Price: {price} | Time: {}",
            format_time(timestamp)
        ),
        RowStatus::Sell { price, timestamp } => format!(
            "Timeframe: {tf} | Signal: Sell | Price: {price} | Time: {}",
            format_time(timestamp)
        ),
    };
    if let Some(err) = &row.error {
        let _ = write!(line, " ({err})");
    }
    line
}

// ─── Text ───────────────────────────────────────────────────────────

/// Render the whole report as the dashboard text view.
pub fn render_text(report: &DashboardReport) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;

    for row in &report.rows {
        if current != Some(row.symbol.as_str()) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "Signals for {}", row.symbol);
            current = Some(row.symbol.as_str());
        }
        let _ = writeln!(out, "  {}", format_row(row));
    }

    let _ = writeln!(
        out,
        "\n{} pairs: {} buy, {} sell, {} hold, {} no data (a = {}, c = {}, span = {}, via {})",
        report.rows.len(),
        report.buy_count(),
        report.sell_count(),
        report.hold_count(),
        report.no_data_count(),
        report.params.multiplier,
        report.params.atr_period,
        report.params.smoothing_span,
        report.provider,
    );
    out
}

// ─── JSON ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct VersionedReport {
    schema_version: u32,
    #[serde(flatten)]
    report: DashboardReport,
}

/// Serialize a report to pretty JSON.
pub fn export_json(report: &DashboardReport) -> Result<String> {
    let wrapped = VersionedReport {
        schema_version: SCHEMA_VERSION,
        report: report.clone(),
    };
    serde_json::to_string_pretty(&wrapped).context("failed to serialize DashboardReport to JSON")
}

/// Deserialize a report from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<DashboardReport> {
    let wrapped: VersionedReport =
        serde_json::from_str(json).context("failed to deserialize DashboardReport from JSON")?;
    if wrapped.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            wrapped.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(wrapped.report)
}

/// Write the JSON report to `path`, creating parent directories.
pub fn write_json(report: &DashboardReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, export_json(report)?)
        .with_context(|| format!("failed to write {}", path.display()))
}

// ─── CSV ────────────────────────────────────────────────────────────

fn opt_f64(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_default()
}

/// Export dashboard rows as CSV.
///
/// Columns: symbol, interval, candles, signal, price, timestamp, error
pub fn export_rows_csv(rows: &[DashboardRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "interval",
        "candles",
        "signal",
        "price",
        "timestamp",
        "error",
    ])?;

    for r in rows {
        wtr.write_record([
            &r.symbol,
            &r.interval.to_string(),
            &r.candles.to_string(),
            &r.result.signal.map(|s| s.to_string()).unwrap_or_default(),
            &opt_f64(r.result.price),
            &r.result.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default(),
            &r.error.clone().unwrap_or_default(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not UTF-8")
}

/// Export the per-candle indicator table as CSV.
///
/// Columns: index, timestamp, close, true_range, atr, n_loss, trailing_stop,
/// smoothed_close, buy, sell
pub fn export_indicator_csv(rows: &[IndicatorRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "index",
        "timestamp",
        "close",
        "true_range",
        "atr",
        "n_loss",
        "trailing_stop",
        "smoothed_close",
        "buy",
        "sell",
    ])?;

    for r in rows {
        wtr.write_record([
            &r.index.to_string(),
            &r.timestamp.to_rfc3339(),
            &format!("{:.6}", r.close),
            &format!("{:.6}", r.true_range),
            &format!("{:.6}", r.atr),
            &format!("{:.6}", r.n_loss),
            &opt_f64(r.trailing_stop),
            &format!("{:.6}", r.smoothed_close),
            &r.is_buy.to_string(),
            &r.is_sell.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not UTF-8")
}
