//! ATR trailing stop: one-sided support/resistance ratchet.
//!
//! Inherently sequential: stop[i] depends on close[i], close[i-1], nLoss[i]
//! and stop[i-1], and nothing else. The first candle has no predecessor, so
//! stop[0] is undefined (`None`). For i >= 1, with `prev = stop[i-1]`:
//!
//! 1. prev defined, close[i] > prev and close[i-1] > prev: max(prev, close[i] - nLoss[i])
//! 2. prev defined, close[i] < prev and close[i-1] < prev: min(prev, close[i] + nLoss[i])
//! 3. prev defined, close[i] > prev:                       close[i] - nLoss[i]
//! 4. otherwise (including prev undefined):                close[i] + nLoss[i]
//!
//! While the trend holds the stop only tightens towards price; a close on the
//! other side flips it to the opposite side of price.

/// Stateful tracker that carries only the previous close and previous stop.
#[derive(Debug, Clone, Default)]
pub struct TrailingStop {
    prev_close: Option<f64>,
    prev_stop: Option<f64>,
}

impl TrailingStop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stop level (the value produced by the last `step`).
    pub fn level(&self) -> Option<f64> {
        self.prev_stop
    }

    /// Advance by one candle and return that candle's stop.
    ///
    /// The first call only records the close and returns `None`.
    pub fn step(&mut self, close: f64, n_loss: f64) -> Option<f64> {
        let stop = self
            .prev_close
            .map(|prev_close| next_stop(close, prev_close, n_loss, self.prev_stop));
        self.prev_close = Some(close);
        self.prev_stop = stop;
        stop
    }
}

fn next_stop(close: f64, prev_close: f64, n_loss: f64, prev_stop: Option<f64>) -> f64 {
    match prev_stop {
        Some(prev) if close > prev && prev_close > prev => prev.max(close - n_loss),
        Some(prev) if close < prev && prev_close < prev => prev.min(close + n_loss),
        Some(prev) if close > prev => close - n_loss,
        _ => close + n_loss,
    }
}

/// Run the recurrence over full series of closes and nLoss offsets.
pub fn trailing_stop_series(closes: &[f64], n_loss: &[f64]) -> Vec<Option<f64>> {
    assert_eq!(
        closes.len(),
        n_loss.len(),
        "closes and nLoss must have equal length"
    );
    let mut tracker = TrailingStop::new();
    closes
        .iter()
        .zip(n_loss)
        .map(|(&close, &loss)| tracker.step(close, loss))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn first_value_is_undefined() {
        let stops = trailing_stop_series(&[100.0], &[5.0]);
        assert_eq!(stops, vec![None]);
    }

    #[test]
    fn second_value_uses_base_case() {
        // stop[0] undefined → rule 4 regardless of the direction of the move
        for (c0, c1) in [(100.0, 110.0), (100.0, 90.0), (100.0, 100.0)] {
            let stops = trailing_stop_series(&[c0, c1], &[3.0, 2.0]);
            assert_eq!(stops[1], Some(c1 + 2.0));
        }
    }

    #[test]
    fn empty_series() {
        assert!(trailing_stop_series(&[], &[]).is_empty());
    }

    #[test]
    fn downtrend_ratchets_down() {
        // stop1 = 98 + 1 = 99
        // i=2: 96 < 99, 98 < 99 → min(99, 97) = 97
        // i=3: 97 > 97? no; 97 < 97? no; → rule 4: 98
        // i=4: 95 < 98, 97 < 98 → min(98, 96) = 96
        let closes = [100.0, 98.0, 96.0, 97.0, 95.0];
        let stops = trailing_stop_series(&closes, &[1.0; 5]);
        assert_eq!(
            stops,
            vec![None, Some(99.0), Some(97.0), Some(98.0), Some(96.0)]
        );
    }

    #[test]
    fn downtrend_stop_never_loosens() {
        // A bounce that stays below the stop must not raise it.
        // stop1 = 95 + 2 = 97
        // i=2: 96 < 97, 95 < 97 → min(97, 98) = 97
        let stops = trailing_stop_series(&[100.0, 95.0, 96.0], &[2.0; 3]);
        assert_eq!(stops[2], Some(97.0));
    }

    #[test]
    fn flip_up_then_ratchet_up() {
        // stop1 = 100 + 2 = 102
        // i=2: 105 > 102 but 100 < 102 → rule 3: 105 - 2 = 103
        // i=3: 108 > 103, 105 > 103 → max(103, 106) = 106
        // i=4: 107 > 106, 108 > 106 → max(106, 105) = 106 (holds)
        let closes = [99.0, 100.0, 105.0, 108.0, 107.0];
        let stops = trailing_stop_series(&closes, &[2.0; 5]);
        assert_eq!(
            stops,
            vec![None, Some(102.0), Some(103.0), Some(106.0), Some(106.0)]
        );
    }

    #[test]
    fn flip_down_from_uptrend() {
        // stop2 = 106 (uptrend, see above); close falls to 101 < 106, prev 108 > 106
        // → rule 4: 101 + 2 = 103
        let closes = [99.0, 100.0, 105.0, 108.0, 101.0];
        let stops = trailing_stop_series(&closes, &[2.0; 5]);
        assert_eq!(stops[4], Some(103.0));
    }

    #[test]
    fn tracker_matches_series() {
        let closes = [10.0, 11.5, 9.0, 9.5, 12.0, 13.0];
        let losses = [0.5, 0.7, 1.1, 0.9, 1.3, 1.0];
        let series = trailing_stop_series(&closes, &losses);
        let mut tracker = TrailingStop::new();
        for (i, (&c, &l)) in closes.iter().zip(&losses).enumerate() {
            let s = tracker.step(c, l);
            assert_eq!(s, series[i]);
            assert_eq!(tracker.level(), series[i]);
        }
    }

    #[test]
    fn worked_example_stops() {
        let closes = [100.0, 102.0, 98.0, 110.0];
        let atr = [4.0, 4.0, 14.0 / 3.0, 7.0];
        let stops = trailing_stop_series(&closes, &atr);
        assert_eq!(stops[0], None);
        assert_eq!(stops[1], Some(106.0));
        assert_approx(stops[2].unwrap(), 98.0 + 14.0 / 3.0, DEFAULT_EPSILON);
        assert_eq!(stops[3], Some(103.0));
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn mismatched_lengths_panic() {
        trailing_stop_series(&[1.0, 2.0], &[1.0]);
    }
}
