//! Crawl pipeline integration tests

use async_trait::async_trait;
use form_backtest::config::CrawlConfig;
use form_backtest::crawl::{CrawlOrchestrator, CrawlStage};
use form_backtest::fetch::{FetchError, PageFetcher};
use form_backtest::race::UNPLACED;
use form_backtest::store::{load_races, DocumentStore, FileStore};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

/// Serves canned pages; unknown URLs answer 404
struct SitePages {
    pages: HashMap<String, String>,
}

impl SitePages {
    fn new(pages: Vec<(&str, String)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, body)| (url.to_string(), body))
                .collect(),
        }
    }
}

#[async_trait]
impl PageFetcher for SitePages {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status_code: 404,
            message: "Not Found".to_string(),
        })
    }
}

const MEETINGS: &str = r#"
    <ul>
        <li><a class="meeting" href="meeting/rand">Randwick</a></li>
        <li><a class="meeting" href="meeting/flem">Flemington</a></li>
        <li><a class="meeting" href="meeting/gone">Moonee Valley</a></li>
        <li><a href="/about">About</a></li>
    </ul>
"#;

const RANDWICK: &str = r##"
    <a href="#" onclick="displayResults(100001)">R1</a>
    <a href="#" onclick="display_results('100002')">R2</a>
"##;

const FLEMINGTON: &str = r##"
    <a href="#" onclick="displayResults(100003)">R1</a>
    <a href="#" onclick="displayResults(100002)">Also R2</a>
"##;

fn form_page() -> String {
    r#"
    <table>
        <thead><tr><th>TAB</th><th>Horse</th><th>NR</th><th>CP</th></tr></thead>
        <tbody id="offTblBdy2">
            <tr><td>1</td><td>Alpha</td><td>90</td><td>70</td></tr>
            <tr><td>2</td><td>Beta</td><td>60</td><td>20</td></tr>
            <tr><td>3</td><td>Gamma</td><td>0</td><td>10</td></tr>
        </tbody>
    </table>
    "#
    .to_string()
}

fn result_page() -> String {
    r#"
    <table>
        <tr><td class="normbold">FP</td><td class="normbold">TAB</td><td class="normbold">Horse</td></tr>
        <tr><td>1</td><td>2</td><td>Beta</td></tr>
        <tr><td></td><td colspan="2">Margin 0.5L</td></tr>
        <tr><td>=2</td><td>1</td><td>Alpha</td></tr>
    </table>
    "#
    .to_string()
}

fn config() -> CrawlConfig {
    CrawlConfig {
        meetings_url: "http://site/meetings".to_string(),
        race_list_base_url: "http://site/".to_string(),
        form_url_template: "http://site/neural?raceid={race_id}".to_string(),
        result_url_template: "http://site/results?raceid={race_id}".to_string(),
        max_concurrent_requests: 2,
        ..CrawlConfig::default()
    }
}

fn site() -> SitePages {
    SitePages::new(vec![
        ("http://site/meetings", MEETINGS.to_string()),
        ("http://site/meeting/rand", RANDWICK.to_string()),
        ("http://site/meeting/flem", FLEMINGTON.to_string()),
        // Race 100001 is complete
        ("http://site/neural?raceid=100001", form_page()),
        ("http://site/results?raceid=100001", result_page()),
        // Race 100002 has no form page
        ("http://site/results?raceid=100002", result_page()),
        // Race 100003 has a result page without the result table
        ("http://site/neural?raceid=100003", form_page()),
        (
            "http://site/results?raceid=100003",
            "<p>Results not yet available</p>".to_string(),
        ),
    ])
}

async fn file_store(dir: &TempDir) -> Arc<FileStore> {
    Arc::new(FileStore::new(dir.path().to_path_buf()).await.unwrap())
}

#[tokio::test]
async fn test_full_crawl_tolerates_unit_failures() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;

    let crawler = CrawlOrchestrator::new(config(), "neural", Arc::new(site()), store.clone()).unwrap();
    let report = crawler.run().await;

    assert_eq!(report.meetings_discovered, 3);
    // 100002 appears under both meetings but is crawled once
    assert_eq!(report.race_ids_discovered, 3);
    assert_eq!(report.races_fetched, 1);
    assert_eq!(report.races_persisted, 1);

    let discovery: Vec<_> = report.failures_in(CrawlStage::DiscoverRaceIds).collect();
    assert_eq!(discovery.len(), 1);
    assert_eq!(discovery[0].unit, "Moonee Valley");

    let mut fetch_units: Vec<&str> = report
        .failures_in(CrawlStage::FetchRaceData)
        .map(|f| f.unit.as_str())
        .collect();
    fetch_units.sort();
    assert_eq!(fetch_units, vec!["100002 form", "100003 result"]);

    let races = load_races(store.as_ref(), "neural", 100).await.unwrap();
    assert_eq!(races.len(), 1);

    let race = &races[0];
    assert_eq!(race.race_id, "100001");
    assert_eq!(race.meeting.as_deref(), Some("Randwick"));
    assert_eq!(race.horse_count, 3);
    assert_eq!(race.crawl_run_id, crawler.run_id());

    let positions: Vec<u32> = race.horses.iter().map(|h| h.finishing_position).collect();
    assert_eq!(positions, vec![2, 1, UNPLACED]);
    assert_eq!(race.horses[0].attributes.get("FP").unwrap(), "=2");
    assert_eq!(race.results.len(), 2);
}

#[tokio::test]
async fn test_discovery_limits() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let config = CrawlConfig {
        limit_meetings: 1,
        limit_race_ids: 1,
        ..config()
    };

    let report = CrawlOrchestrator::new(config, "neural", Arc::new(site()), store.clone())
        .unwrap()
        .run()
        .await;

    assert_eq!(report.meetings_discovered, 1);
    assert_eq!(report.race_ids_discovered, 1);
    assert_eq!(report.races_persisted, 1);
    assert!(report.failures.is_empty());

    let docs = store.bulk_get("neural", 10).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["race_id"], "100001");
}

#[tokio::test]
async fn test_seeded_crawl_skips_discovery() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let config = CrawlConfig {
        meetings_url: "http://site/unreachable".to_string(),
        seed_race_ids: vec!["100001".to_string(), "100001".to_string()],
        ..config()
    };

    let report = CrawlOrchestrator::new(config, "neural", Arc::new(site()), store.clone())
        .unwrap()
        .run()
        .await;

    assert_eq!(report.meetings_discovered, 0);
    assert_eq!(report.race_ids_discovered, 1);
    assert_eq!(report.races_persisted, 1);
    assert!(report.failures.is_empty());

    let races = load_races(store.as_ref(), "neural", 10).await.unwrap();
    assert_eq!(races[0].meeting, None);
}
