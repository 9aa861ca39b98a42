//! Buy/Sell classification of a single candle against its trailing stop.

use crate::domain::Signal;

/// Buy/Sell flags for one candle. Never both true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub is_buy: bool,
    pub is_sell: bool,
}

impl Classification {
    /// Classify `close` and its smoothed counterpart against `stop`.
    ///
    /// Both prices must be strictly on the same side of the stop. Equality
    /// classifies as neither, and an undefined stop classifies as neither.
    pub fn classify(close: f64, smoothed: f64, stop: Option<f64>) -> Self {
        match stop {
            None => Self::default(),
            Some(stop) => Self {
                is_buy: close > stop && smoothed > stop,
                is_sell: close < stop && smoothed < stop,
            },
        }
    }

    /// `Some(Buy)` / `Some(Sell)` when a flag is set, `None` otherwise.
    pub fn signal(&self) -> Option<Signal> {
        if self.is_buy {
            Some(Signal::Buy)
        } else if self.is_sell {
            Some(Signal::Sell)
        } else {
            None
        }
    }
}
