//! Indicator building blocks for the trailing-stop signal.
//!
//! - `atr`: true range and a rolling-mean ATR whose window grows from one
//!   sample up to the period (never undefined once TR is defined)
//! - `ema`: span-parameterised exponential smoothing
//! - `trailing_stop`: the sequential ATR trailing-stop recurrence
//!
//! All functions take a full series and return a series of the same length.
//! No value at index t depends on data from index t+1 or later.

pub mod atr;
pub mod ema;
pub mod trailing_stop;

pub use atr::{rolling_mean, true_range, AtrEstimator};
pub use ema::ema_span;
pub use trailing_stop::{trailing_stop_series, TrailingStop};

/// Create synthetic candles from close prices for testing.
///
/// high = close + spread, low = close - spread, open = previous close,
/// one-minute spacing.
#[cfg(test)]
pub fn make_candles(closes: &[f64], spread: f64) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    use chrono::TimeZone;
    let base = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: base + chrono::Duration::minutes(i as i64),
            open: if i == 0 { close } else { closes[i - 1] },
            high: close + spread,
            low: close - spread,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
