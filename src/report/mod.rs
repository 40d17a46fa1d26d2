//! Normalized field report
//!
//! Flattens every eligible race into one row per horse and writes the rows
//! as CSV or Parquet

mod writer;

pub use writer::{report_schema, to_record_batch, ReportWriter};

use crate::analysis::Backtester;
use crate::config::ReportConfig;
use crate::race::{Outcome, RaceRecord};
use thiserror::Error;

/// Report errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One horse in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub race_id: String,
    /// Normalized values, aligned with the scored attributes
    pub values: Vec<i64>,
    pub normalized_sum: i64,
    pub outcome: Outcome,
}

/// Flatten eligible races into report rows.
///
/// Rows are ordered by race ID descending, then normalized sum descending.
/// With `runners_only`, horses without a positive NR rating are omitted.
pub fn build_rows(races: &[RaceRecord], backtester: &Backtester, runners_only: bool) -> Vec<ReportRow> {
    let attributes = &backtester.config().attributes;

    let mut rows: Vec<ReportRow> = races
        .iter()
        .filter_map(|race| backtester.normalize_eligible(race))
        .flat_map(|race| {
            let race_id = race.race_id;
            race.horses
                .into_iter()
                .filter(|horse| !runners_only || horse.rated)
                .map(|horse| ReportRow {
                    race_id: race_id.clone(),
                    values: attributes.iter().map(|tag| horse.value(*tag)).collect(),
                    normalized_sum: horse.normalized_sum,
                    outcome: Outcome::from_position(horse.finishing_position),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    rows.sort_by(|a, b| {
        b.race_id
            .cmp(&a.race_id)
            .then(b.normalized_sum.cmp(&a.normalized_sum))
    });
    rows
}

/// Build and write the report described by `config`; returns the row count.
/// Write failures are logged and returned to the caller.
pub fn export(
    races: &[RaceRecord],
    backtester: &Backtester,
    config: &ReportConfig,
) -> Result<usize, ReportError> {
    let rows = build_rows(races, backtester, config.runners_only);
    let writer = ReportWriter::new(backtester.config().attributes.clone());

    match writer.write(&rows, &config.output, config.format) {
        Ok(()) => {
            tracing::info!(path = ?config.output, rows = rows.len(), "Exported report");
            Ok(rows.len())
        }
        Err(e) => {
            tracing::error!(path = ?config.output, error = %e, "Failed to write report");
            Err(e)
        }
    }
}
