//! Candle provider trait and structured error types.
//!
//! The CandleProvider trait abstracts over data sources (Binance REST, CSV
//! files) so the runner can swap implementations and tests can mock them.

use crate::domain::{CandleSeries, Interval};
use thiserror::Error;

/// Number of most recent candles requested when the caller does not say.
pub const DEFAULT_LIMIT: usize = 100;

/// Structured error types for data operations.
///
/// These are designed to be displayable in both CLI output and report rows.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} for {symbol} ({interval})")]
    HttpStatus {
        status: u16,
        symbol: String,
        interval: Interval,
    },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for candle providers (Binance, CSV import, etc).
///
/// Implementations return the `limit` most recent candles, oldest first.
/// "No data" is an empty series; `Err` is reserved for faults.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

impl<P: CandleProvider + ?Sized> CandleProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        (**self).fetch(symbol, interval, limit)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// A fetched series together with the fault that emptied it, if any.
#[derive(Debug)]
pub struct FetchOutcome {
    pub series: CandleSeries,
    pub fault: Option<DataError>,
}

/// Fetch, degrading any fault to an empty series reported alongside it.
pub fn fetch_or_empty(
    provider: &dyn CandleProvider,
    symbol: &str,
    interval: Interval,
    limit: usize,
) -> FetchOutcome {
    match provider.fetch(symbol, interval, limit) {
        Ok(series) => FetchOutcome {
            series,
            fault: None,
        },
        Err(e) => {
            tracing::warn!(provider = provider.name(), %symbol, %interval, error = %e, "fetch failed");
            FetchOutcome {
                series: CandleSeries::empty(),
                fault: Some(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl CandleProvider for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, symbol: &str, _: Interval, _: usize) -> Result<CandleSeries, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
    }

    struct Empty;

    impl CandleProvider for Empty {
        fn name(&self) -> &str {
            "empty"
        }

        fn fetch(&self, _: &str, _: Interval, _: usize) -> Result<CandleSeries, DataError> {
            Ok(CandleSeries::empty())
        }
    }

    #[test]
    fn fault_becomes_empty_series_with_error() {
        let outcome = fetch_or_empty(&Failing, "NOPE", Interval::OneHour, 100);
        assert!(outcome.series.is_empty());
        assert!(matches!(
            outcome.fault,
            Some(DataError::SymbolNotFound { ref symbol }) if symbol == "NOPE"
        ));
    }

    #[test]
    fn empty_series_is_not_a_fault() {
        let outcome = fetch_or_empty(&Empty, "BTCUSDT", Interval::OneDay, 100);
        assert!(outcome.series.is_empty());
        assert!(outcome.fault.is_none());
    }

    #[test]
    fn boxed_provider_delegates() {
        let boxed: Box<dyn CandleProvider> = Box::new(Failing);
        assert_eq!(boxed.name(), "failing");
        assert!(boxed.is_available());
        assert!(boxed.fetch("X", Interval::OneMinute, 1).is_err());
    }
}
