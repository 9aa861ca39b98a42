//! Offline CSV candle provider.
//!
//! Reads `<dir>/<SYMBOL>_<interval>.csv`, e.g. `BTCUSDT_1h.csv`, with header
//! `timestamp,open,high,low,close,volume` and the timestamp in epoch
//! milliseconds (the Binance open time).

use super::provider::{CandleProvider, DataError};
use crate::domain::{Candle, CandleSeries, Interval};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.dir.join(format!("{symbol}_{interval}.csv"))
    }

    /// Read every candle in a CSV file, oldest first.
    pub fn read_file(path: &Path) -> Result<CandleSeries, DataError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
        let mut candles = Vec::new();

        for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| csv_error(path, e))?;
            let timestamp = DateTime::<Utc>::from_timestamp_millis(row.timestamp).ok_or_else(|| {
                DataError::Validation(format!(
                    "{}: row {} has invalid timestamp {}",
                    path.display(),
                    i + 1,
                    row.timestamp
                ))
            })?;
            let candle = Candle {
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            };
            if !candle.is_sane() {
                tracing::warn!(path = %path.display(), row = i + 1, "candle OHLC values are inconsistent");
            }
            candles.push(candle);
        }

        let series = CandleSeries::new(candles);
        if !series.is_chronological() {
            return Err(DataError::Validation(format!(
                "{}: timestamps are not strictly increasing",
                path.display()
            )));
        }
        Ok(series)
    }
}

fn csv_error(path: &Path, e: csv::Error) -> DataError {
    DataError::Csv(format!("{}: {e}", path.display()))
}

impl CandleProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        let path = self.path_for(symbol, interval);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(Self::read_file(&path)?.tail(limit))
    }
}
