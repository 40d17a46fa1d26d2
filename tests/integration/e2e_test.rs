//! End-to-end integration tests

use async_trait::async_trait;
use form_backtest::analysis::Backtester;
use form_backtest::config::{Config, ReportConfig, ReportFormat, StoreBackend};
use form_backtest::crawl::CrawlOrchestrator;
use form_backtest::fetch::{FetchError, PageFetcher};
use form_backtest::race::AttributeTag;
use form_backtest::report;
use form_backtest::store::{load_races, open_store, DocumentStore};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    config.validate().unwrap();

    assert_eq!(config.store.index, "neural");
    assert_eq!(config.crawl.join_column, "TAB");
    assert!(config.crawl.result_table.skip_blank_leading_cell);
    assert_eq!(config.analysis.sum_threshold, 2600);
    assert_eq!(config.analysis.attributes, AttributeTag::PREDICTORS.to_vec());
    assert_eq!(config.report.format, ReportFormat::Csv);
}

struct RaceSite {
    pages: HashMap<String, String>,
}

#[async_trait]
impl PageFetcher for RaceSite {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status_code: 404,
            message: "Not Found".to_string(),
        })
    }
}

/// Ten-runner form page; card 1 carries 100 on every predictor, the rest 10
fn form_page() -> String {
    let mut header = String::from("<tr><th>TAB</th><th>Horse</th>");
    for tag in AttributeTag::PREDICTORS {
        header.push_str(&format!("<th>{}</th>", tag.key()));
    }
    header.push_str("</tr>");

    let mut body = String::new();
    for card in 1..=10 {
        let value = if card == 1 { "100" } else { "10" };
        body.push_str(&format!("<tr><td>{}</td><td>Runner {}</td>", card, card));
        for _ in AttributeTag::PREDICTORS {
            body.push_str(&format!("<td>{}</td>", value));
        }
        body.push_str("</tr>");
    }

    format!(
        r#"<table><thead>{}</thead><tbody id="offTblBdy2">{}</tbody></table>"#,
        header, body
    )
}

/// Result page where card N finished Nth
fn result_page() -> String {
    let mut rows = String::from(
        r#"<tr><td class="normbold">FP</td><td class="normbold">TAB</td></tr>"#,
    );
    for card in 1..=10 {
        rows.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>", card, card));
    }
    format!("<table>{}</table>", rows)
}

#[tokio::test]
async fn test_crawl_analyse_export() {
    let dir = TempDir::new().unwrap();

    let mut config = Config::default();
    config.store.backend = StoreBackend::Filesystem;
    config.store.path = dir.path().join("store");
    config.crawl.form_url_template = "http://site/neural?raceid={race_id}".to_string();
    config.crawl.result_url_template = "http://site/results?raceid={race_id}".to_string();
    config.crawl.seed_race_ids = vec!["200001".to_string()];

    let site = RaceSite {
        pages: HashMap::from([
            ("http://site/neural?raceid=200001".to_string(), form_page()),
            ("http://site/results?raceid=200001".to_string(), result_page()),
        ]),
    };

    // Crawl
    let store: Arc<dyn DocumentStore> = Arc::from(open_store(&config.store).await.unwrap());
    let crawler = CrawlOrchestrator::new(
        config.crawl.clone(),
        config.store.index.clone(),
        Arc::new(site),
        store.clone(),
    )
    .unwrap();
    let crawl_report = crawler.run().await;
    assert_eq!(crawl_report.races_persisted, 1);
    assert!(crawl_report.failures.is_empty());

    // Analyse
    let races = load_races(store.as_ref(), &config.store.index, config.store.page_size)
        .await
        .unwrap();
    assert_eq!(races.len(), 1);
    assert_eq!(races[0].horse_count, 10);

    let backtester = Backtester::new(config.analysis.clone());
    let summary = backtester.run(&races);
    assert_eq!(summary.max_normal_system.races_considered, 1);
    assert_eq!(summary.max_normal_system.outright_winners_picked, 1);
    assert_eq!(summary.max_normal_system.places_picked, 1);

    // Export
    let report_config = ReportConfig {
        output: dir.path().join("esdump.csv"),
        ..ReportConfig::default()
    };
    let rows = report::export(&races, &backtester, &report_config).unwrap();
    assert_eq!(rows, 10);

    let csv = std::fs::read_to_string(&report_config.output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(
        lines[0],
        "ID,NR,CP,HCP,CF,TIM,SCR,JA,TA,JT,BP,WET,CRS,D,$,DLR,NormalSum,Outcome"
    );
    assert!(lines[1].starts_with("200001,526,526,"));
    assert!(lines[1].ends_with(",7890,WIN"));
    assert!(lines[2].ends_with(",795,PLACE"));
    assert!(lines[10].ends_with(",795,NONE"));
}
