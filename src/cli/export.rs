//! Export command implementation

use crate::analysis::Backtester;
use crate::config::{Config, ReportFormat};
use crate::report;
use crate::store::{load_races, open_store};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Parquet,
}

impl From<ExportFormat> for ReportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Csv => ReportFormat::Csv,
            ExportFormat::Parquet => ReportFormat::Parquet,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (defaults to report.output)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to report.format)
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Include horses without a positive NR rating
    #[arg(long)]
    pub all_horses: bool,
}

impl ExportArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut report_config = config.report.clone();
        if let Some(output) = &self.output {
            report_config.output = output.clone();
        }
        if let Some(format) = self.format {
            report_config.format = format.into();
        }
        if self.all_horses {
            report_config.runners_only = false;
        }

        let store = open_store(&config.store).await?;
        let races = load_races(store.as_ref(), &config.store.index, config.store.page_size).await?;

        let backtester = Backtester::new(config.analysis.clone());
        let rows = report::export(&races, &backtester, &report_config)?;

        println!("Wrote {} rows to {}", rows, report_config.output.display());
        Ok(())
    }
}
