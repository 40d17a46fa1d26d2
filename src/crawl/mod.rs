//! Race crawling
//!
//! Discovers meetings and races, fetches their form and result pages,
//! merges them and persists the merged races

mod orchestrator;
mod types;

pub use orchestrator::CrawlOrchestrator;
pub use types::{CrawlError, CrawlReport, CrawlStage, PageKind, UnitFailure};
