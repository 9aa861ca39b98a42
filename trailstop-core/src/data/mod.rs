//! Candle data providers.
//!
//! The engine never touches the network. Providers sit at the edge and hand
//! it a `CandleSeries`; `fetch_or_empty` turns a provider fault into an empty
//! series plus a separately reported error.

pub mod binance;
pub mod cached;
pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;

pub use binance::BinanceProvider;
pub use cached::CachedProvider;
pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use provider::{fetch_or_empty, CandleProvider, DataError, FetchOutcome, DEFAULT_LIMIT};
