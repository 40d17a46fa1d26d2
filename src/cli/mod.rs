//! CLI interface for form-backtest
//!
//! Provides subcommands for:
//! - `crawl`: Scrape meetings and races into the document store
//! - `analyse`: Backtest the scoring heuristics over stored races
//! - `export`: Write the normalized field report
//! - `config`: Show the effective configuration

mod analyse;
mod crawl;
mod export;

pub use analyse::AnalyseArgs;
pub use crawl::CrawlArgs;
pub use export::{ExportArgs, ExportFormat};

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "form-backtest")]
#[command(about = "Scrape horse-racing form guides and backtest scoring heuristics")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape races into the document store
    Crawl(CrawlArgs),
    /// Backtest the heuristics over stored races
    Analyse(AnalyseArgs),
    /// Export normalized fields as CSV or Parquet
    Export(ExportArgs),
    /// Show configuration
    Config,
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
