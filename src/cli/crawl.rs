//! Crawl command implementation

use super::OutputFormat;
use crate::config::Config;
use crate::crawl::CrawlOrchestrator;
use crate::fetch::{HttpFetcher, HttpFetcherConfig, PageFetcher};
use crate::store::{open_store, DocumentStore};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Maximum meetings to expand (0 = unbounded)
    #[arg(long)]
    pub limit_meetings: Option<usize>,

    /// Maximum race IDs to fetch (0 = unbounded)
    #[arg(long)]
    pub limit_race_ids: Option<usize>,

    /// Crawl these race IDs directly, skipping discovery
    #[arg(long = "race-id")]
    pub race_ids: Vec<String>,

    /// Output format: table or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl CrawlArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut crawl = config.crawl.clone();
        if let Some(limit) = self.limit_meetings {
            crawl.limit_meetings = limit;
        }
        if let Some(limit) = self.limit_race_ids {
            crawl.limit_race_ids = limit;
        }
        if !self.race_ids.is_empty() {
            crawl.seed_race_ids = self.race_ids.clone();
        }

        let fetcher: Arc<dyn PageFetcher> =
            Arc::new(HttpFetcher::with_config(HttpFetcherConfig::from(&config.fetch))?);
        let store: Arc<dyn DocumentStore> = Arc::from(open_store(&config.store).await?);

        let orchestrator = CrawlOrchestrator::new(crawl, config.store.index.clone(), fetcher, store)?;
        let report = orchestrator.run().await;

        match self.format {
            OutputFormat::Table => println!("{}", report.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
        Ok(())
    }
}
