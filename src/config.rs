//! Configuration types for form-backtest

use crate::parse::TableLocator;
use crate::race::AttributeTag;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    crate::fetch::DEFAULT_USER_AGENT.to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Crawl configuration: page locations, selectors and fan-out caps
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Page listing the meetings
    #[serde(default = "default_meetings_url")]
    pub meetings_url: String,

    /// Base URL that relative meeting links are resolved against
    #[serde(default = "default_race_list_base_url")]
    pub race_list_base_url: String,

    /// Form (neural) page, `{race_id}` is substituted
    #[serde(default = "default_form_url_template")]
    pub form_url_template: String,

    /// Result page, `{race_id}` is substituted
    #[serde(default = "default_result_url_template")]
    pub result_url_template: String,

    /// Selector for meeting links on the meetings page
    #[serde(default = "default_meeting_link_selector")]
    pub meeting_link_selector: String,

    /// Selector for candidate race links on a meeting page
    #[serde(default = "default_race_link_selector")]
    pub race_link_selector: String,

    /// Regex whose first capture group is the race ID
    #[serde(default = "default_race_id_pattern")]
    pub race_id_pattern: String,

    #[serde(default = "default_form_table")]
    pub form_table: TableLocator,

    #[serde(default = "default_result_table")]
    pub result_table: TableLocator,

    /// Column shared by form and result tables (race-card number)
    #[serde(default = "default_join_column")]
    pub join_column: String,

    /// Result column holding the finishing position
    #[serde(default = "default_finishing_position_column")]
    pub finishing_position_column: String,

    /// Maximum meetings to expand (0 = unbounded)
    #[serde(default)]
    pub limit_meetings: usize,

    /// Maximum race IDs to fetch (0 = unbounded)
    #[serde(default)]
    pub limit_race_ids: usize,

    /// Maximum in-flight requests per stage (0 = unbounded)
    #[serde(default)]
    pub max_concurrent_requests: usize,

    /// Crawl these race IDs directly, skipping discovery
    #[serde(default)]
    pub seed_race_ids: Vec<String>,
}

fn default_meetings_url() -> String {
    "http://localhost/meetings.html".to_string()
}
fn default_race_list_base_url() -> String {
    "http://localhost/".to_string()
}
fn default_form_url_template() -> String {
    "http://localhost/neuraltest.html?raceid={race_id}".to_string()
}
fn default_result_url_template() -> String {
    "http://localhost/resultstest.html?raceid={race_id}".to_string()
}
fn default_meeting_link_selector() -> String {
    "a.meeting".to_string()
}
fn default_race_link_selector() -> String {
    "a".to_string()
}
fn default_race_id_pattern() -> String {
    r"(?i)display_?results?\D{0,8}(\d{6})".to_string()
}
fn default_form_table() -> TableLocator {
    TableLocator::new("#offTblBdy2")
}
fn default_result_table() -> TableLocator {
    TableLocator::new("table .normbold").skipping_blank_leading_cell()
}
fn default_join_column() -> String {
    "TAB".to_string()
}
fn default_finishing_position_column() -> String {
    "FP".to_string()
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            meetings_url: default_meetings_url(),
            race_list_base_url: default_race_list_base_url(),
            form_url_template: default_form_url_template(),
            result_url_template: default_result_url_template(),
            meeting_link_selector: default_meeting_link_selector(),
            race_link_selector: default_race_link_selector(),
            race_id_pattern: default_race_id_pattern(),
            form_table: default_form_table(),
            result_table: default_result_table(),
            join_column: default_join_column(),
            finishing_position_column: default_finishing_position_column(),
            limit_meetings: 0,
            limit_race_ids: 0,
            max_concurrent_requests: 0,
            seed_race_ids: vec![],
        }
    }
}

/// Document store backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Elasticsearch,
    Filesystem,
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Elasticsearch endpoint
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Collection (index) holding race documents
    #[serde(default = "default_index")]
    pub index: String,
    /// Document type path segment
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    /// Root directory for the filesystem backend
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Maximum documents bulk-read for analysis
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_store_url() -> String {
    crate::store::DEFAULT_STORE_URL.to_string()
}
fn default_index() -> String {
    "neural".to_string()
}
fn default_doc_type() -> String {
    "_doc".to_string()
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./data")
}
fn default_page_size() -> usize {
    2000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_store_url(),
            index: default_index(),
            doc_type: default_doc_type(),
            path: default_store_path(),
            page_size: default_page_size(),
        }
    }
}

/// Backtest configuration: eligibility bounds and heuristic thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Smallest eligible field (inclusive)
    #[serde(default = "default_min_horses")]
    pub min_horses: usize,
    /// Largest eligible field (inclusive)
    #[serde(default = "default_max_horses")]
    pub max_horses: usize,
    /// Max normalized sum must exceed this for the sum heuristic to pick
    #[serde(default = "default_sum_threshold")]
    pub sum_threshold: i64,
    /// Top normalized value must exceed this for an attribute to pick
    #[serde(default = "default_attribute_threshold")]
    pub attribute_threshold: i64,
    /// Tags normalized and scored
    #[serde(default = "default_attributes")]
    pub attributes: Vec<AttributeTag>,
}

fn default_min_horses() -> usize {
    9
}
fn default_max_horses() -> usize {
    14
}
fn default_sum_threshold() -> i64 {
    2600
}
fn default_attribute_threshold() -> i64 {
    300
}
fn default_attributes() -> Vec<AttributeTag> {
    AttributeTag::PREDICTORS.to_vec()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_horses: default_min_horses(),
            max_horses: default_max_horses(),
            sum_threshold: default_sum_threshold(),
            attribute_threshold: default_attribute_threshold(),
            attributes: default_attributes(),
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Parquet,
}

/// Normalized-field report configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub format: ReportFormat,
    /// Only export horses with a positive NR rating
    #[serde(default = "default_true")]
    pub runners_only: bool,
}

fn default_report_output() -> PathBuf {
    PathBuf::from("./esdump.csv")
}
fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_report_output(),
            format: ReportFormat::default(),
            runners_only: true,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.analysis.min_horses > self.analysis.max_horses {
            anyhow::bail!(
                "analysis.min_horses ({}) exceeds analysis.max_horses ({})",
                self.analysis.min_horses,
                self.analysis.max_horses
            );
        }
        if self
            .analysis
            .attributes
            .iter()
            .any(|tag| tag.is_outcome())
        {
            anyhow::bail!("analysis.attributes must not include the outcome tag FP");
        }
        for (name, template) in [
            ("crawl.form_url_template", &self.crawl.form_url_template),
            ("crawl.result_url_template", &self.crawl.result_url_template),
        ] {
            if !template.contains("{race_id}") {
                anyhow::bail!("{} must contain a {{race_id}} placeholder", name);
            }
        }
        regex::Regex::new(&self.crawl.race_id_pattern)?;
        Ok(())
    }
}
