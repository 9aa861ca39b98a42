//! Signal parameters.
//!
//! The three knobs of the trailing-stop signal. `smoothing_span` defaults to 1,
//! which makes the smoothed close identical to the raw close; it is exposed so
//! that the confirmation filter can be widened deliberately.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_ATR_PERIOD: usize = 10;
pub const DEFAULT_SMOOTHING_SPAN: usize = 1;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("multiplier must be finite and > 0, got {0}")]
    InvalidMultiplier(f64),

    #[error("ATR period must be >= 1")]
    ZeroAtrPeriod,

    #[error("smoothing span must be >= 1")]
    ZeroSmoothingSpan,
}

/// Parameters for the ATR trailing-stop signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Volatility multiplier `a`: `nLoss = a * ATR`.
    #[serde(alias = "a")]
    pub multiplier: f64,
    /// ATR window length `c`, in candles.
    #[serde(alias = "c")]
    pub atr_period: usize,
    /// Span of the exponential smoothing used as the secondary confirmation.
    pub smoothing_span: usize,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
            atr_period: DEFAULT_ATR_PERIOD,
            smoothing_span: DEFAULT_SMOOTHING_SPAN,
        }
    }
}

impl SignalParams {
    /// Parameters with the given `a` and `c` and the default smoothing span.
    pub fn new(multiplier: f64, atr_period: usize) -> Self {
        Self {
            multiplier,
            atr_period,
            ..Self::default()
        }
    }

    pub fn with_smoothing_span(mut self, span: usize) -> Self {
        self.smoothing_span = span;
        self
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(ParamError::InvalidMultiplier(self.multiplier));
        }
        if self.atr_period == 0 {
            return Err(ParamError::ZeroAtrPeriod);
        }
        if self.smoothing_span == 0 {
            return Err(ParamError::ZeroSmoothingSpan);
        }
        Ok(())
    }
}
