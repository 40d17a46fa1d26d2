//! Analyse command implementation

use super::OutputFormat;
use crate::analysis::Backtester;
use crate::config::Config;
use crate::store::{load_races, open_store};
use crate::telemetry::{set_gauge, GaugeMetric};
use clap::Args;
use rust_decimal::prelude::ToPrimitive;

#[derive(Args, Debug)]
pub struct AnalyseArgs {
    /// Maximum documents to read (defaults to store.page_size)
    #[arg(long)]
    pub max_races: Option<usize>,

    /// Output format: table or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl AnalyseArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = open_store(&config.store).await?;
        let max_races = self.max_races.unwrap_or(config.store.page_size);
        let races = load_races(store.as_ref(), &config.store.index, max_races).await?;

        let summary = Backtester::new(config.analysis.clone()).run(&races);

        let sum = &summary.max_normal_system;
        set_gauge(GaugeMetric::SumRacesConsidered, sum.races_considered as f64);
        set_gauge(
            GaugeMetric::SumWinPct,
            sum.outright_winners_percentage.to_f64().unwrap_or(0.0),
        );
        set_gauge(
            GaugeMetric::SumPlacePct,
            sum.places_percentage.to_f64().unwrap_or(0.0),
        );

        match self.format {
            OutputFormat::Table => println!("{}", summary.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        }
        Ok(())
    }
}
