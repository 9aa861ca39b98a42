//! Serializable dashboard configuration.
//!
//! Every section is optional; an empty file gives the reference dashboard
//! (ten USDT pairs × four timeframes, 100 candles, a = 1, c = 10).
//!
//! ```toml
//! symbols = ["BTCUSDT", "ETHUSDT"]
//! timeframes = ["15m", "1h"]
//! limit = 100
//!
//! [signal]
//! a = 1.0
//! c = 10
//! smoothing_span = 1
//!
//! [provider]
//! kind = "binance"
//! cache_ttl_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use trailstop_core::data::{
    BinanceProvider, CachedProvider, CandleProvider, CircuitBreaker, CsvProvider, DataError,
    DEFAULT_LIMIT,
};
use trailstop_core::{Interval, ParamError, SignalError, SignalParams};

pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "BTCUSDT",
    "ETHUSDT",
    "XRPUSDT",
    "ADAUSDT",
    "BNBUSDT",
    "SOLUSDT",
    "DOTUSDT",
    "DOGEUSDT",
    "MATICUSDT",
    "SHIBUSDT",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid signal parameters: {0}")]
    Params(#[from] ParamError),

    #[error("signal engine: {0}")]
    Engine(#[from] SignalError),

    #[error("symbol list is empty")]
    NoSymbols,

    #[error("timeframe list is empty")]
    NoTimeframes,

    #[error("limit must be >= 1")]
    ZeroLimit,

    #[error("provider kind 'csv' requires csv_dir")]
    MissingCsvDir,

    #[error("failed to build provider: {0}")]
    Provider(#[from] DataError),
}

/// Where candles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Binance,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Binance REST base URL.
    pub base_url: String,
    /// Response cache TTL; 0 disables caching.
    pub cache_ttl_secs: u64,
    /// Directory of `<SYMBOL>_<interval>.csv` files for `kind = "csv"`.
    pub csv_dir: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Binance,
            base_url: trailstop_core::data::binance::DEFAULT_BASE_URL.to_string(),
            cache_ttl_secs: 60,
            csv_dir: None,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kind == ProviderKind::Csv && self.csv_dir.is_none() {
            return Err(ConfigError::MissingCsvDir);
        }
        Ok(())
    }

    /// Build the configured provider, wrapped in a TTL cache when enabled.
    pub fn build(&self) -> Result<Box<dyn CandleProvider>, ConfigError> {
        self.validate()?;
        let provider: Box<dyn CandleProvider> = match self.kind {
            ProviderKind::Binance => Box::new(BinanceProvider::with_base_url(
                self.base_url.clone(),
                Arc::new(CircuitBreaker::default_provider()),
            )?),
            ProviderKind::Csv => {
                let dir = self.csv_dir.clone().ok_or(ConfigError::MissingCsvDir)?;
                Box::new(CsvProvider::new(dir))
            }
        };

        if self.cache_ttl_secs == 0 {
            return Ok(provider);
        }
        Ok(Box::new(CachedProvider::new(
            provider,
            Duration::from_secs(self.cache_ttl_secs),
        )))
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub symbols: Vec<String>,
    pub timeframes: Vec<Interval>,
    /// Candles requested per (symbol, timeframe).
    pub limit: usize,
    pub signal: SignalParams,
    pub provider: ProviderConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            timeframes: Interval::ALL.to_vec(),
            limit: DEFAULT_LIMIT,
            signal: SignalParams::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if self.timeframes.is_empty() {
            return Err(ConfigError::NoTimeframes);
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        self.signal.validate()?;
        self.provider.validate()
    }

    /// Every (symbol, timeframe) pair, symbols outermost, in config order.
    pub fn pairs(&self) -> Vec<(String, Interval)> {
        self.symbols
            .iter()
            .flat_map(|s| self.timeframes.iter().map(move |&tf| (s.clone(), tf)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_reference_dashboard() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.symbols.len(), 10);
        assert_eq!(config.timeframes, Interval::ALL.to_vec());
        assert_eq!(config.limit, 100);
        assert_eq!(config.provider.cache_ttl_secs, 60);
    }

    #[test]
    fn parses_full_config() {
        let config = DashboardConfig::from_toml(
            r#"
symbols = ["BTCUSDT", "SOLUSDT"]
timeframes = ["15m", "1d"]
limit = 250

[signal]
a = 2.0
c = 14
smoothing_span = 3

[provider]
kind = "csv"
csv_dir = "fixtures"
cache_ttl_secs = 0
"#,
        )
        .unwrap();
        assert_eq!(config.symbols, vec!["BTCUSDT", "SOLUSDT"]);
        assert_eq!(
            config.timeframes,
            vec![Interval::FifteenMinutes, Interval::OneDay]
        );
        assert_eq!(config.limit, 250);
        assert_eq!(config.signal, SignalParams::new(2.0, 14).with_smoothing_span(3));
        assert_eq!(config.provider.kind, ProviderKind::Csv);
        assert_eq!(config.provider.csv_dir, Some(PathBuf::from("fixtures")));
    }

    #[test]
    fn long_param_names_accepted() {
        let config = DashboardConfig::from_toml("[signal]\nmultiplier = 1.5\natr_period = 7\n").unwrap();
        assert_eq!(config.signal.multiplier, 1.5);
        assert_eq!(config.signal.atr_period, 7);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            DashboardConfig::from_toml("symbols = []"),
            Err(ConfigError::NoSymbols)
        ));
        assert!(matches!(
            DashboardConfig::from_toml("timeframes = []"),
            Err(ConfigError::NoTimeframes)
        ));
        assert!(matches!(
            DashboardConfig::from_toml("limit = 0"),
            Err(ConfigError::ZeroLimit)
        ));
        assert!(matches!(
            DashboardConfig::from_toml("[signal]\na = 0.0"),
            Err(ConfigError::Params(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml("[provider]\nkind = \"csv\""),
            Err(ConfigError::MissingCsvDir)
        ));
        assert!(matches!(
            DashboardConfig::from_toml("timeframes = [\"4h\"]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn pairs_are_symbol_major() {
        let config = DashboardConfig {
            symbols: vec!["A".into(), "B".into()],
            timeframes: vec![Interval::OneMinute, Interval::OneDay],
            ..DashboardConfig::default()
        };
        assert_eq!(
            config.pairs(),
            vec![
                ("A".to_string(), Interval::OneMinute),
                ("A".to_string(), Interval::OneDay),
                ("B".to_string(), Interval::OneMinute),
                ("B".to_string(), Interval::OneDay),
            ]
        );
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = DashboardConfig::from_file(Path::new("/nonexistent/dashboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn csv_provider_builds_without_network() {
        let provider = ProviderConfig {
            kind: ProviderKind::Csv,
            csv_dir: Some(PathBuf::from(".")),
            ..ProviderConfig::default()
        }
        .build()
        .unwrap();
        assert_eq!(provider.name(), "csv");
    }
}
