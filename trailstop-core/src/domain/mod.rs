//! Domain types for TrailStop

pub mod candle;
pub mod interval;
pub mod signal;

pub use candle::{Candle, CandleSeries};
pub use interval::{Interval, IntervalParseError};
pub use signal::{IndicatorRow, Signal, SignalResult};
