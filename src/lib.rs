//! form-backtest: Horse-racing form scraper and scoring-heuristic backtester
//!
//! This library provides the core components for:
//! - Discovering meetings and races from listing pages
//! - Extracting form and result tables from HTML
//! - Merging results into race fields on the race-card number
//! - Persisting races to an Elasticsearch-compatible or file store
//! - Normalizing fields and backtesting the scoring heuristics
//! - Exporting normalized fields to CSV or Parquet

pub mod analysis;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod fetch;
pub mod parse;
pub mod race;
pub mod report;
pub mod store;
pub mod telemetry;
