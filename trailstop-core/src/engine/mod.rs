//! Signal engine: volatility estimate → trailing stop → classification.
//!
//! The engine is a pure function of its inputs. Every call derives all rows
//! fresh from the candle series; nothing is cached between calls.

pub mod classifier;
pub mod signal_engine;

pub use classifier::Classification;
pub use signal_engine::{evaluate, SignalEngine, SignalError};
