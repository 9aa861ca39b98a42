//! Multi-instrument, multi-timeframe signal dashboard.
//!
//! Each (symbol, timeframe) pair is fetched and evaluated independently, so
//! pairs fan out across the rayon pool with no shared mutable state. A pair
//! that cannot be fetched or evaluated yields a no-data row carrying the
//! error; it never aborts the others.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use trailstop_core::data::{fetch_or_empty, CandleProvider};
use trailstop_core::{Interval, SignalEngine, SignalParams, SignalResult};

use crate::config::{ConfigError, DashboardConfig};

/// One evaluated (symbol, timeframe) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub symbol: String,
    pub interval: Interval,
    /// Number of candles the provider returned.
    pub candles: usize,
    pub result: SignalResult,
    /// Fetch fault or rejected series, reported apart from the (empty) result.
    pub error: Option<String>,
}

/// Output of one dashboard pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub provider: String,
    pub params: SignalParams,
    pub rows: Vec<DashboardRow>,
}

impl DashboardReport {
    pub fn buy_count(&self) -> usize {
        self.count(|r| r.signal == Some(trailstop_core::Signal::Buy))
    }

    pub fn sell_count(&self) -> usize {
        self.count(|r| r.signal == Some(trailstop_core::Signal::Sell))
    }

    pub fn hold_count(&self) -> usize {
        self.count(|r| r.signal == Some(trailstop_core::Signal::Hold))
    }

    pub fn no_data_count(&self) -> usize {
        self.count(SignalResult::is_empty)
    }

    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|r| r.error.is_some()).count()
    }

    /// Rows for one symbol, in timeframe order.
    pub fn rows_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a DashboardRow> + 'a {
        self.rows.iter().filter(move |r| r.symbol == symbol)
    }

    fn count(&self, pred: impl Fn(&SignalResult) -> bool) -> usize {
        self.rows.iter().filter(|r| pred(&r.result)).count()
    }
}

/// Dashboard executor.
pub struct Dashboard {
    config: DashboardConfig,
    engine: SignalEngine,
    parallel: bool,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = SignalEngine::new(config.signal)?;
        Ok(Self {
            config,
            engine,
            parallel: true,
        })
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Evaluate every configured pair against `provider`.
    ///
    /// Row order follows `DashboardConfig::pairs` regardless of parallelism.
    pub fn run(&self, provider: &dyn CandleProvider) -> DashboardReport {
        let pairs = self.config.pairs();

        let rows: Vec<DashboardRow> = if self.parallel {
            pairs
                .par_iter()
                .map(|(symbol, interval)| self.evaluate_pair(provider, symbol, *interval))
                .collect()
        } else {
            pairs
                .iter()
                .map(|(symbol, interval)| self.evaluate_pair(provider, symbol, *interval))
                .collect()
        };

        let report = DashboardReport {
            generated_at: Utc::now(),
            provider: provider.name().to_string(),
            params: *self.engine.params(),
            rows,
        };

        tracing::info!(
            pairs = report.rows.len(),
            buy = report.buy_count(),
            sell = report.sell_count(),
            hold = report.hold_count(),
            no_data = report.no_data_count(),
            errors = report.error_count(),
            "dashboard pass complete"
        );

        report
    }

    /// Fetch and evaluate a single pair.
    pub fn evaluate_pair(
        &self,
        provider: &dyn CandleProvider,
        symbol: &str,
        interval: Interval,
    ) -> DashboardRow {
        let outcome = fetch_or_empty(provider, symbol, interval, self.config.limit);
        let candles = outcome.series.len();

        let (result, error) = match outcome.fault {
            Some(fault) => (SignalResult::empty(), Some(fault.to_string())),
            None => match self.engine.evaluate(&outcome.series) {
                Ok(result) => (result, None),
                Err(e) => {
                    tracing::warn!(%symbol, %interval, error = %e, "series rejected");
                    (SignalResult::empty(), Some(e.to_string()))
                }
            },
        };

        tracing::debug!(%symbol, %interval, candles, signal = ?result.signal, "evaluated pair");

        DashboardRow {
            symbol: symbol.to_string(),
            interval,
            candles,
            result,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trailstop_core::data::DataError;
    use trailstop_core::{Candle, CandleSeries, Signal};

    /// Serves a rising series for "UP", a falling one for "DOWN", nothing for
    /// "EMPTY" and a fault for anything else.
    struct Scripted;

    fn series(closes: &[f64]) -> CandleSeries {
        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: base + chrono::Duration::minutes(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1.0,
            })
            .collect()
    }

    impl CandleProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch(&self, symbol: &str, _: Interval, limit: usize) -> Result<CandleSeries, DataError> {
            match symbol {
                "UP" => Ok(series(&[100.0, 101.0, 106.0, 110.0]).tail(limit)),
                "DOWN" => Ok(series(&[100.0, 99.0, 94.0, 90.0]).tail(limit)),
                "EMPTY" => Ok(CandleSeries::empty()),
                _ => Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }),
            }
        }
    }

    fn config(symbols: &[&str]) -> DashboardConfig {
        DashboardConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            timeframes: vec![Interval::OneMinute, Interval::OneHour],
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn rows_follow_config_order() {
        let dashboard = Dashboard::new(config(&["DOWN", "UP", "EMPTY"])).unwrap();
        let report = dashboard.run(&Scripted);
        let order: Vec<(&str, Interval)> = report
            .rows
            .iter()
            .map(|r| (r.symbol.as_str(), r.interval))
            .collect();
        assert_eq!(
            order,
            vec![
                ("DOWN", Interval::OneMinute),
                ("DOWN", Interval::OneHour),
                ("UP", Interval::OneMinute),
                ("UP", Interval::OneHour),
                ("EMPTY", Interval::OneMinute),
                ("EMPTY", Interval::OneHour),
            ]
        );
    }

    #[test]
    fn classifies_each_pair() {
        let report = Dashboard::new(config(&["UP", "DOWN"])).unwrap().run(&Scripted);
        let up = report.rows_for("UP").next().unwrap();
        assert_eq!(up.result.signal, Some(Signal::Buy));
        assert_eq!(up.result.price, Some(110.0));
        let down = report.rows_for("DOWN").next().unwrap();
        assert_eq!(down.result.signal, Some(Signal::Sell));
        assert_eq!(report.buy_count(), 2);
        assert_eq!(report.sell_count(), 2);
        assert_eq!(report.provider, "scripted");
    }

    #[test]
    fn fault_is_isolated_to_its_row() {
        let report = Dashboard::new(config(&["UP", "MISSING", "EMPTY"]))
            .unwrap()
            .run(&Scripted);
        let missing: Vec<_> = report.rows_for("MISSING").collect();
        assert!(missing.iter().all(|r| r.result.is_empty()));
        assert!(missing
            .iter()
            .all(|r| r.error.as_deref() == Some("symbol not found: MISSING")));

        let empty: Vec<_> = report.rows_for("EMPTY").collect();
        assert!(empty.iter().all(|r| r.result.is_empty() && r.error.is_none()));

        assert_eq!(report.no_data_count(), 4);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.buy_count(), 2);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let cfg = config(&["UP", "DOWN", "EMPTY", "MISSING"]);
        let par = Dashboard::new(cfg.clone()).unwrap().run(&Scripted);
        let seq = Dashboard::new(cfg)
            .unwrap()
            .with_parallelism(false)
            .run(&Scripted);
        assert_eq!(par.rows, seq.rows);
    }

    #[test]
    fn limit_is_passed_to_provider() {
        let cfg = DashboardConfig {
            limit: 1,
            ..config(&["UP"])
        };
        let report = Dashboard::new(cfg).unwrap().run(&Scripted);
        let row = report.rows_for("UP").next().unwrap();
        assert_eq!(row.candles, 1);
        assert_eq!(row.result.signal, Some(Signal::Hold));
        assert_eq!(row.result.price, None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = DashboardConfig {
            symbols: vec![],
            ..DashboardConfig::default()
        };
        assert!(matches!(Dashboard::new(cfg), Err(ConfigError::NoSymbols)));
    }
}
