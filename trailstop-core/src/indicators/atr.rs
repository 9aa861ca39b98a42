//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR here is a simple rolling mean of TR over `period` candles. At the start
//! of the series the window shrinks instead of being undefined, so ATR[0] is
//! TR[0] and ATR[i] for i < period is the mean of TR[0..=i].

use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct AtrEstimator {
    period: usize,
}

impl AtrEstimator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        self.average(&true_range(candles))
    }

    /// ATR from an already computed TR series.
    pub fn average(&self, true_range: &[f64]) -> Vec<f64> {
        rolling_mean(true_range, self.period)
    }
}

/// Compute the True Range series from candles.
/// TR[0] = high[0] - low[0] (no previous close, the gap terms are omitted).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(candles.len());

    if let Some(first) = candles.first() {
        tr.push(first.high - first.low);
    }

    for pair in candles.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let pc = prev.close;
        tr.push(
            (cur.high - cur.low)
                .max((cur.high - pc).abs())
                .max((cur.low - pc).abs()),
        );
    }

    tr
}

/// Arithmetic mean over `values[max(0, i-window+1)..=i]` for every i.
///
/// Each window is summed directly, so a value never carries rounding residue
/// from samples that have already left the window.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "rolling window must be >= 1");
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
