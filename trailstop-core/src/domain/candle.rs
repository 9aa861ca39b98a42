//! Candle: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single instrument over one time bucket.
///
/// `timestamp` is the bucket's open time. All numeric fields are `f64`,
/// volume included (crypto venues report fractional base-asset volume).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Name of the first numeric field that is NaN or infinite, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// Basic OHLC sanity check: high >= low and both bracket open/close.
    pub fn is_sane(&self) -> bool {
        self.non_finite_field().is_none()
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// Time-ordered sequence of candles for one (instrument, interval) pair.
///
/// Ordering is assumed (oldest first, no duplicate timestamps), not enforced.
/// Providers that can check it cheaply do so with [`CandleSeries::is_chronological`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandleSeries(Vec<Candle>);

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self(candles)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.0
    }

    /// Most recent candle.
    pub fn last(&self) -> Option<&Candle> {
        self.0.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.0.iter().map(|c| c.close).collect()
    }

    /// Keep only the `limit` most recent candles.
    pub fn tail(mut self, limit: usize) -> Self {
        if self.0.len() > limit {
            let drop = self.0.len() - limit;
            self.0.drain(..drop);
        }
        self
    }

    /// True if timestamps are strictly increasing.
    pub fn is_chronological(&self) -> bool {
        self.0.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
    }

    pub fn into_inner(self) -> Vec<Candle> {
        self.0
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self(candles)
    }
}

impl FromIterator<Candle> for CandleSeries {
    fn from_iter<I: IntoIterator<Item = Candle>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CandleSeries {
    type Item = Candle;
    type IntoIter = std::vec::IntoIter<Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
