//! Signal output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional classification of the most recent candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
        };
        f.write_str(s)
    }
}

/// Result of evaluating one candle series.
///
/// Three shapes are possible:
/// - all `None`: the series was empty (no data),
/// - `Hold` with a timestamp but no price,
/// - `Buy`/`Sell` with both price and timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalResult {
    pub signal: Option<Signal>,
    pub price: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl SignalResult {
    /// The no-data result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.signal.is_none()
    }
}

/// Derived indicator values for one candle index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub true_range: f64,
    pub atr: f64,
    pub n_loss: f64,
    /// `None` only at index 0, where the recurrence has no predecessor.
    pub trailing_stop: Option<f64>,
    pub smoothed_close: f64,
    pub is_buy: bool,
    pub is_sell: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_has_no_fields() {
        let r = SignalResult::empty();
        assert!(r.is_empty());
        assert_eq!(r.price, None);
        assert_eq!(r.timestamp, None);
    }

    #[test]
    fn signal_display() {
        assert_eq!(Signal::Buy.to_string(), "Buy");
        assert_eq!(Signal::Sell.to_string(), "Sell");
        assert_eq!(Signal::Hold.to_string(), "Hold");
    }
}
