//! TrailStop Runner: dashboard orchestration on top of `trailstop-core`.
//!
//! This crate provides:
//! - TOML dashboard configuration (symbols, timeframes, signal params, provider)
//! - Parallel evaluation of every (symbol, timeframe) pair
//! - Text, JSON and CSV reporting

pub mod config;
pub mod dashboard;
pub mod export;

pub use config::{ConfigError, DashboardConfig, ProviderConfig, ProviderKind};
pub use dashboard::{Dashboard, DashboardReport, DashboardRow};
pub use export::{
    export_indicator_csv, export_json, export_rows_csv, import_json, render_text, write_json,
    RowStatus,
};
