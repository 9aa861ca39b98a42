//! TrailStop Core: candle types, ATR trailing-stop indicators, signal engine,
//! data providers.
//!
//! This crate contains the signal computation and its edges:
//! - Domain types (candles, series, intervals, signal results)
//! - True range and a rolling-mean ATR
//! - The sequential trailing-stop recurrence
//! - Buy/Sell/Hold classification of the latest candle
//! - Candle providers (Binance REST, CSV files) with TTL caching and a circuit breaker

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod params;

pub use domain::{Candle, CandleSeries, IndicatorRow, Interval, Signal, SignalResult};
pub use engine::{evaluate, SignalEngine, SignalError};
pub use params::{ParamError, SignalParams};
