//! Staged crawl orchestrator
//!
//! Drives one crawl run through its stages:
//! 1. Discover meetings from the meetings page
//! 2. Discover race IDs from each meeting's race list
//! 3. Fetch the form and result page of every race
//! 4. Merge results into each race's field
//! 5. Persist every merged race, then close the store
//!
//! Each stage fans its units out concurrently and waits for all of them to
//! settle before the next stage starts. A failed unit is logged, recorded
//! in the report and dropped; it never aborts the run.

use super::types::{CrawlError, CrawlReport, CrawlStage, PageKind, UnitFailure};
use crate::config::CrawlConfig;
use crate::fetch::PageFetcher;
use crate::parse::{extract_meetings, extract_race_ids, extract_table, ParsedTable};
use crate::race::{merge_results, HorseRecord, Meeting, RaceRecord};
use crate::store::{put_race, DocumentStore};
use crate::telemetry::{increment, CounterMetric};
use futures_util::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Url;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// A race queued for fetching
#[derive(Debug, Clone)]
struct RaceTarget {
    race_id: String,
    meeting: Option<String>,
}

/// A race whose form and result pages both parsed
struct FetchedRace {
    target: RaceTarget,
    form: ParsedTable,
    result: ParsedTable,
}

/// Data handed from one stage to the next
#[derive(Default)]
struct CrawlState {
    meetings: Vec<Meeting>,
    targets: Vec<RaceTarget>,
    fetched: Vec<FetchedRace>,
    races: Vec<RaceRecord>,
}

/// Number of in-flight units for a stage; 0 means all of them
fn concurrency_limit(max_concurrent_requests: usize, units: usize) -> usize {
    if max_concurrent_requests == 0 {
        units.max(1)
    } else {
        max_concurrent_requests
    }
}

/// Apply a 0-means-unbounded limit
fn truncate_to_limit<T>(items: &mut Vec<T>, limit: usize) {
    if limit > 0 {
        items.truncate(limit);
    }
}

/// Crawl orchestrator
pub struct CrawlOrchestrator {
    config: CrawlConfig,
    collection: String,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn DocumentStore>,
    race_id_pattern: Regex,
    race_list_base: Url,
    run_id: Uuid,
}

impl CrawlOrchestrator {
    /// Create an orchestrator writing races into `collection`
    pub fn new(
        config: CrawlConfig,
        collection: impl Into<String>,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, CrawlError> {
        let race_id_pattern = Regex::new(&config.race_id_pattern)
            .map_err(|e| CrawlError::InvalidConfig(format!("race_id_pattern: {}", e)))?;
        let race_list_base =
            Url::parse(&config.race_list_base_url).map_err(|e| CrawlError::InvalidUrl {
                url: config.race_list_base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            config,
            collection: collection.into(),
            fetcher,
            store,
            race_id_pattern,
            race_list_base,
            run_id: Uuid::new_v4(),
        })
    }

    /// Identifier stamped on every race this run persists
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run every stage to completion
    pub async fn run(&self) -> CrawlReport {
        let mut state = CrawlState::default();
        let mut report = CrawlReport::new(self.run_id);

        let mut stage = if self.config.seed_race_ids.is_empty() {
            CrawlStage::DiscoverMeetings
        } else {
            self.seed_targets(&mut state, &mut report);
            CrawlStage::FetchRaceData
        };

        tracing::info!(run_id = %self.run_id, start = %stage, "Starting crawl");

        loop {
            tracing::debug!(stage = %stage, "Entering crawl stage");
            stage = match stage {
                CrawlStage::DiscoverMeetings => {
                    self.discover_meetings(&mut state, &mut report).await;
                    CrawlStage::DiscoverRaceIds
                }
                CrawlStage::DiscoverRaceIds => {
                    self.discover_race_ids(&mut state, &mut report).await;
                    CrawlStage::FetchRaceData
                }
                CrawlStage::FetchRaceData => {
                    self.fetch_race_data(&mut state, &mut report).await;
                    CrawlStage::Merge
                }
                CrawlStage::Merge => {
                    self.merge(&mut state, &mut report);
                    CrawlStage::Persist
                }
                CrawlStage::Persist => {
                    self.persist(&mut state, &mut report).await;
                    CrawlStage::Done
                }
                CrawlStage::Done => break,
            };
        }

        tracing::info!(
            run_id = %self.run_id,
            meetings = report.meetings_discovered,
            race_ids = report.race_ids_discovered,
            persisted = report.races_persisted,
            failures = report.failures.len(),
            "Crawl complete"
        );
        report
    }

    /// Run `work` over every unit with the configured concurrency cap.
    /// Returns once all units have settled, in completion order; outputs
    /// carry their own unit key.
    async fn fan_out<T, F, Fut>(&self, units: Vec<T>, work: F) -> Vec<Fut::Output>
    where
        F: FnMut(T) -> Fut,
        Fut: Future,
    {
        let limit = concurrency_limit(self.config.max_concurrent_requests, units.len());
        stream::iter(units)
            .map(work)
            .buffer_unordered(limit)
            .collect()
            .await
    }

    fn record_failure(
        &self,
        report: &mut CrawlReport,
        stage: CrawlStage,
        unit: String,
        error: &CrawlError,
    ) {
        let metric = match error {
            CrawlError::Fetch(_) | CrawlError::InvalidUrl { .. } => CounterMetric::FetchFailures,
            CrawlError::Parse(_) | CrawlError::InvalidConfig(_) => CounterMetric::ParseFailures,
            CrawlError::Persist(_) => CounterMetric::PersistFailures,
        };
        increment(metric);
        tracing::warn!(stage = %stage, unit = %unit, error = %error, "Dropping failed unit");

        report.failures.push(UnitFailure {
            stage,
            unit,
            error: error.to_string(),
        });
    }

    async fn fetch_page(&self, url: &str) -> Result<String, CrawlError> {
        let body = self.fetcher.fetch(url).await?;
        increment(CounterMetric::PagesFetched);
        tracing::trace!(url = url, bytes = body.len(), "Fetched page");
        Ok(body)
    }

    fn seed_targets(&self, state: &mut CrawlState, report: &mut CrawlReport) {
        let mut seen = HashSet::new();
        state.targets = self
            .config
            .seed_race_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
            .map(|id| RaceTarget {
                race_id: id.to_string(),
                meeting: None,
            })
            .collect();
        truncate_to_limit(&mut state.targets, self.config.limit_race_ids);
        report.race_ids_discovered = state.targets.len();
    }

    async fn discover_meetings(&self, state: &mut CrawlState, report: &mut CrawlReport) {
        let result = match self.fetch_page(&self.config.meetings_url).await {
            Ok(html) => extract_meetings(&html, &self.config.meeting_link_selector)
                .map_err(CrawlError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(mut meetings) => {
                truncate_to_limit(&mut meetings, self.config.limit_meetings);
                tracing::info!(count = meetings.len(), "Discovered meetings");
                state.meetings = meetings;
            }
            Err(e) => self.record_failure(
                report,
                CrawlStage::DiscoverMeetings,
                self.config.meetings_url.clone(),
                &e,
            ),
        }
        report.meetings_discovered = state.meetings.len();
    }

    async fn meeting_race_ids(&self, meeting: &Meeting) -> Result<Vec<String>, CrawlError> {
        let url = self
            .race_list_base
            .join(&meeting.link)
            .map_err(|e| CrawlError::InvalidUrl {
                url: meeting.link.clone(),
                message: e.to_string(),
            })?;
        let html = self.fetch_page(url.as_str()).await?;
        Ok(extract_race_ids(
            &html,
            &self.config.race_link_selector,
            &self.race_id_pattern,
        )?)
    }

    async fn discover_race_ids(&self, state: &mut CrawlState, report: &mut CrawlReport) {
        let meetings: Vec<(usize, Meeting)> =
            std::mem::take(&mut state.meetings).into_iter().enumerate().collect();
        let mut outcomes = self
            .fan_out(meetings, |(index, meeting)| async move {
                let result = self.meeting_race_ids(&meeting).await;
                (index, meeting, result)
            })
            .await;
        // Meeting order decides which meeting owns a shared race ID
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut seen = HashSet::new();
        for (_, meeting, result) in outcomes {
            match result {
                Ok(race_ids) => {
                    tracing::debug!(meeting = %meeting.id, count = race_ids.len(), "Discovered race IDs");
                    for race_id in race_ids {
                        if seen.insert(race_id.clone()) {
                            state.targets.push(RaceTarget {
                                race_id,
                                meeting: Some(meeting.id.clone()),
                            });
                        }
                    }
                }
                Err(e) => self.record_failure(report, CrawlStage::DiscoverRaceIds, meeting.id, &e),
            }
        }

        truncate_to_limit(&mut state.targets, self.config.limit_race_ids);
        report.race_ids_discovered = state.targets.len();
        tracing::info!(count = state.targets.len(), "Discovered race IDs");
    }

    async fn fetch_race_page(
        &self,
        race_id: &str,
        kind: PageKind,
    ) -> Result<ParsedTable, CrawlError> {
        let (template, locator) = match kind {
            PageKind::Form => (&self.config.form_url_template, &self.config.form_table),
            PageKind::Result => (&self.config.result_url_template, &self.config.result_table),
        };
        let url = template.replace("{race_id}", race_id);
        let html = self.fetch_page(&url).await?;
        Ok(extract_table(&html, locator)?)
    }

    async fn fetch_race_data(&self, state: &mut CrawlState, report: &mut CrawlReport) {
        let targets = std::mem::take(&mut state.targets);
        let units: Vec<(usize, PageKind)> = (0..targets.len())
            .flat_map(|index| [(index, PageKind::Form), (index, PageKind::Result)])
            .collect();

        let outcomes = self
            .fan_out(units, |(index, kind)| {
                let race_id = targets[index].race_id.as_str();
                async move { (index, kind, self.fetch_race_page(race_id, kind).await) }
            })
            .await;

        let mut pages: Vec<(Option<ParsedTable>, Option<ParsedTable>)> =
            (0..targets.len()).map(|_| (None, None)).collect();
        for (index, kind, result) in outcomes {
            match result {
                Ok(table) => match kind {
                    PageKind::Form => pages[index].0 = Some(table),
                    PageKind::Result => pages[index].1 = Some(table),
                },
                Err(e) => {
                    let unit = format!("{} {}", targets[index].race_id, kind);
                    self.record_failure(report, CrawlStage::FetchRaceData, unit, &e);
                }
            }
        }

        state.fetched = targets
            .into_iter()
            .zip(pages)
            .filter_map(|(target, pages)| match pages {
                (Some(form), Some(result)) => Some(FetchedRace {
                    target,
                    form,
                    result,
                }),
                _ => None,
            })
            .collect();
        report.races_fetched = state.fetched.len();
        tracing::info!(count = state.fetched.len(), "Fetched race pages");
    }

    fn merge(&self, state: &mut CrawlState, report: &mut CrawlReport) {
        let join_column = self.config.join_column.as_str();

        for fetched in std::mem::take(&mut state.fetched) {
            let FetchedRace {
                target,
                form,
                result,
            } = fetched;

            let mut race = RaceRecord::new(target.race_id, target.meeting, self.run_id);
            race.set_field(
                form.rows
                    .into_iter()
                    .map(|row| HorseRecord::from_row(row, join_column))
                    .collect(),
            );

            let stats = merge_results(
                &mut race,
                result.rows,
                join_column,
                &self.config.finishing_position_column,
            );
            if stats.unmatched > 0 {
                tracing::debug!(
                    race_id = %race.race_id,
                    unmatched = stats.unmatched,
                    "Horses without a result row recorded as unplaced"
                );
            }
            report.unmatched_horses += stats.unmatched;
            state.races.push(race);
        }

        report.races_merged = state.races.len();
    }

    async fn persist(&self, state: &mut CrawlState, report: &mut CrawlReport) {
        let races = std::mem::take(&mut state.races);
        let units: Vec<&RaceRecord> = races.iter().collect();
        let outcomes = self
            .fan_out(units, |race| async move {
                let result = put_race(self.store.as_ref(), &self.collection, race).await;
                (race.race_id.as_str(), result)
            })
            .await;

        for (race_id, result) in outcomes {
            match result {
                Ok(()) => {
                    increment(CounterMetric::RacesPersisted);
                    report.races_persisted += 1;
                }
                Err(e) => self.record_failure(
                    report,
                    CrawlStage::Persist,
                    race_id.to_string(),
                    &CrawlError::from(e),
                ),
            }
        }

        if let Err(e) = self.store.close().await {
            tracing::warn!(error = %e, "Failed to close document store");
        }
        tracing::info!(count = report.races_persisted, "Persisted races");
    }
}
