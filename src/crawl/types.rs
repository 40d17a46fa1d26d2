//! Crawl types

use crate::fetch::FetchError;
use crate::parse::ParseError;
use crate::store::PersistError;
use serde::Serialize;
use std::fmt;
use std::fmt::Write;
use thiserror::Error;
use uuid::Uuid;

/// Crawl errors. All of them are recovered per unit.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("Invalid crawl configuration: {0}")]
    InvalidConfig(String),
}

/// Crawl pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStage {
    DiscoverMeetings,
    DiscoverRaceIds,
    FetchRaceData,
    Merge,
    Persist,
    Done,
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrawlStage::DiscoverMeetings => "DISCOVER_MEETINGS",
            CrawlStage::DiscoverRaceIds => "DISCOVER_RACE_IDS",
            CrawlStage::FetchRaceData => "FETCH_RACE_DATA",
            CrawlStage::Merge => "MERGE",
            CrawlStage::Persist => "PERSIST",
            CrawlStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Which race page a fetch unit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Form,
    Result,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::Form => f.write_str("form"),
            PageKind::Result => f.write_str("result"),
        }
    }
}

/// A unit that failed and was dropped from the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    pub stage: CrawlStage,
    /// Meeting id or race id (with page kind) of the failed unit
    pub unit: String,
    pub error: String,
}

/// Outcome of one crawl run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub run_id: Uuid,
    pub meetings_discovered: usize,
    pub race_ids_discovered: usize,
    /// Races with both form and result pages parsed
    pub races_fetched: usize,
    pub races_merged: usize,
    pub races_persisted: usize,
    /// Form horses with no matching result row
    pub unmatched_horses: usize,
    pub failures: Vec<UnitFailure>,
}

impl CrawlReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            meetings_discovered: 0,
            race_ids_discovered: 0,
            races_fetched: 0,
            races_merged: 0,
            races_persisted: 0,
            unmatched_horses: 0,
            failures: vec![],
        }
    }

    /// Failures recorded during `stage`
    pub fn failures_in(&self, stage: CrawlStage) -> impl Iterator<Item = &UnitFailure> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let mut out = format!(
            r#"
══════════════════════════════════════════════════════
               CRAWL REPORT
══════════════════════════════════════════════════════
Run:              {}
Meetings:         {}
Race IDs:         {}
Races Fetched:    {}
Races Merged:     {}
Races Persisted:  {}
Unmatched Horses: {}
Failures:         {}
"#,
            self.run_id,
            self.meetings_discovered,
            self.race_ids_discovered,
            self.races_fetched,
            self.races_merged,
            self.races_persisted,
            self.unmatched_horses,
            self.failures.len(),
        );
        for failure in &self.failures {
            let _ = writeln!(out, "  [{}] {}: {}", failure.stage, failure.unit, failure.error);
        }
        out.push_str("══════════════════════════════════════════════════════\n");
        out
    }
}
