//! Binance spot klines provider.
//!
//! Fetches the most recent candles from `GET /api/v3/klines`. Handles retries
//! with exponential backoff, error-body mapping and the circuit breaker.
//!
//! Each kline is a JSON array:
//! `[openTimeMs, "open", "high", "low", "close", "volume", closeTimeMs, ...]`
//! with prices and volume encoded as decimal strings.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{CandleProvider, DataError};
use crate::domain::{Candle, CandleSeries, Interval};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Binance returns this code for an unknown trading pair.
const INVALID_SYMBOL_CODE: i64 = -1121;

/// Binance error body, e.g. `{"code":-1121,"msg":"Invalid symbol."}`.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

pub struct BinanceProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl BinanceProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL, circuit_breaker)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    fn klines_url(&self, symbol: &str, interval: Interval, limit: usize) -> String {
        format!(
            "{}/api/v3/klines?symbol={symbol}&interval={interval}&limit={limit}",
            self.base_url
        )
    }

    /// Parse a klines body into candles.
    ///
    /// Anything that is not a non-empty array of arrays is "no data" and
    /// yields an empty series. A kline row of the wrong shape is a fault.
    pub fn parse_klines(body: &Value) -> Result<CandleSeries, DataError> {
        let rows = match body.as_array() {
            Some(rows) if rows.first().map_or(false, Value::is_array) => rows,
            _ => return Ok(CandleSeries::empty()),
        };

        rows.iter()
            .enumerate()
            .map(|(i, row)| parse_kline(i, row))
            .collect::<Result<Vec<_>, _>>()
            .map(CandleSeries::new)
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = self.klines_url(symbol, interval, limit);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(%symbol, %interval, attempt, ?delay, "retrying klines request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            // 403: WAF block, 418: IP auto-banned after ignoring 429s
            if status == reqwest::StatusCode::FORBIDDEN || status.as_u16() == 418 {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                tracing::warn!(%symbol, %interval, retry_after, "rate limited");
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status.is_server_error() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::HttpStatus {
                    status: status.as_u16(),
                    symbol: symbol.to_string(),
                    interval,
                });
                continue;
            }

            if !status.is_success() {
                let body = resp.text().unwrap_or_default();
                return Err(map_client_error(symbol, interval, status.as_u16(), &body));
            }

            let body: Value = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol} ({interval}): {e}"
                ))
            })?;

            let series = Self::parse_klines(&body)?;
            self.circuit_breaker.record_success();
            tracing::debug!(%symbol, %interval, candles = series.len(), "fetched klines");
            return Ok(series);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// Map a non-success reply. Bodies that are not a Binance error object
/// (HTML from a proxy, empty bodies) keep the bare status.
fn map_client_error(symbol: &str, interval: Interval, status: u16, body: &str) -> DataError {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) if err.code == INVALID_SYMBOL_CODE => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Ok(err) => DataError::Other(format!(
            "binance error {} for {symbol} ({interval}): {}",
            err.code, err.msg
        )),
        Err(_) => DataError::HttpStatus {
            status,
            symbol: symbol.to_string(),
            interval,
        },
    }
}

fn parse_kline(index: usize, row: &Value) -> Result<Candle, DataError> {
    let fields = row
        .as_array()
        .filter(|f| f.len() >= 6)
        .ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("kline {index} is not an array of >= 6 fields"))
        })?;

    let open_time_ms = fields[0].as_i64().ok_or_else(|| {
        DataError::ResponseFormatChanged(format!("kline {index} has a non-integer open time"))
    })?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(open_time_ms).ok_or_else(|| {
        DataError::ResponseFormatChanged(format!("kline {index} has invalid open time {open_time_ms}"))
    })?;

    let number = |pos: usize, name: &str| -> Result<f64, DataError> {
        decimal_field(&fields[pos]).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("kline {index} has a malformed {name}"))
        })
    };

    Ok(Candle {
        timestamp,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")?,
    })
}

/// Binance encodes decimals as strings; accept bare numbers too.
fn decimal_field(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

impl CandleProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        self.fetch_with_retry(symbol, interval, limit)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
