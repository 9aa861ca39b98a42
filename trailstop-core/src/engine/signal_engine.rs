//! Single forward pass over a candle series producing one `IndicatorRow` per
//! candle, and the latest-candle `SignalResult`.

use crate::domain::{CandleSeries, IndicatorRow, Signal, SignalResult};
use crate::engine::classifier::Classification;
use crate::indicators::{ema_span, true_range, AtrEstimator, TrailingStop};
use crate::params::{ParamError, SignalParams};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamError),

    #[error("candle {index} has a non-finite {field}")]
    NonFiniteCandle { index: usize, field: &'static str },
}

/// ATR trailing-stop signal engine for one parameter set.
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    params: SignalParams,
}

impl SignalEngine {
    pub fn new(params: SignalParams) -> Result<Self, SignalError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    /// Compute every derived row for the series.
    ///
    /// Rejects the whole series if any candle has a NaN or infinite field, so
    /// an undefined value never enters the recurrence.
    pub fn indicator_rows(&self, series: &CandleSeries) -> Result<Vec<IndicatorRow>, SignalError> {
        let candles = series.candles();
        if let Some((index, field)) = candles
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.non_finite_field().map(|f| (i, f)))
        {
            return Err(SignalError::NonFiniteCandle { index, field });
        }

        let tr = true_range(candles);
        let atr_values = AtrEstimator::new(self.params.atr_period).average(&tr);
        let smoothed = ema_span(&series.closes(), self.params.smoothing_span);

        let mut stop = TrailingStop::new();
        let rows = candles
            .iter()
            .enumerate()
            .map(|(i, candle)| {
                let n_loss = self.params.multiplier * atr_values[i];
                let trailing_stop = stop.step(candle.close, n_loss);
                let flags = Classification::classify(candle.close, smoothed[i], trailing_stop);
                IndicatorRow {
                    index: i,
                    timestamp: candle.timestamp,
                    close: candle.close,
                    true_range: tr[i],
                    atr: atr_values[i],
                    n_loss,
                    trailing_stop,
                    smoothed_close: smoothed[i],
                    is_buy: flags.is_buy,
                    is_sell: flags.is_sell,
                }
            })
            .collect();

        Ok(rows)
    }

    /// Classify the most recent candle.
    ///
    /// Empty series → all-`None` result. Otherwise Buy/Sell carry the last
    /// close and timestamp; Hold carries the timestamp only.
    pub fn evaluate(&self, series: &CandleSeries) -> Result<SignalResult, SignalError> {
        let rows = self.indicator_rows(series)?;
        Ok(rows.last().map(latest_result).unwrap_or_default())
    }
}

fn latest_result(row: &IndicatorRow) -> SignalResult {
    let flags = Classification {
        is_buy: row.is_buy,
        is_sell: row.is_sell,
    };
    match flags.signal() {
        Some(signal) => SignalResult {
            signal: Some(signal),
            price: Some(row.close),
            timestamp: Some(row.timestamp),
        },
        None => SignalResult {
            signal: Some(Signal::Hold),
            price: None,
            timestamp: Some(row.timestamp),
        },
    }
}

/// Evaluate with multiplier `a` and ATR period `c`, default smoothing span.
pub fn evaluate(series: &CandleSeries, a: f64, c: usize) -> Result<SignalResult, SignalError> {
    SignalEngine::new(SignalParams::new(a, c))?.evaluate(series)
}
