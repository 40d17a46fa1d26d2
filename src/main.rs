use clap::Parser;
use form_backtest::cli::{Cli, Commands};
use form_backtest::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    form_backtest::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Crawl(args) => {
            tracing::info!("Starting crawl");
            args.execute(&config).await?;
        }
        Commands::Analyse(args) => {
            tracing::info!("Starting backtest");
            args.execute(&config).await?;
        }
        Commands::Export(args) => {
            tracing::info!("Starting export");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Meetings: {}", config.crawl.meetings_url);
            println!("  Form: {}", config.crawl.form_url_template);
            println!("  Result: {}", config.crawl.result_url_template);
            println!(
                "  Limits: meetings={}, race_ids={}, concurrency={}",
                config.crawl.limit_meetings,
                config.crawl.limit_race_ids,
                config.crawl.max_concurrent_requests
            );
            println!(
                "  Store: {:?} {} (index {})",
                config.store.backend, config.store.url, config.store.index
            );
            println!(
                "  Analysis: horses {}-{}, sum>{}, attribute>{}",
                config.analysis.min_horses,
                config.analysis.max_horses,
                config.analysis.sum_threshold,
                config.analysis.attribute_threshold
            );
            let tags: Vec<&str> = config.analysis.attributes.iter().map(|t| t.key()).collect();
            println!("  Attributes: {}", tags.join(" "));
            println!(
                "  Report: {} ({:?})",
                config.report.output.display(),
                config.report.format
            );
        }
    }

    Ok(())
}
