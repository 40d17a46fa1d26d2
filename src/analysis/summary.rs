//! Backtest results and reporting

use super::tally::{BacktestTally, HeuristicSummary};
use crate::race::AttributeTag;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Summary statistics from a backtest run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BacktestSummary {
    /// Races read from the store
    pub total_races: u64,
    /// Races passing the field-size rule
    pub eligible_races: u64,
    /// Sum-of-normalized-attributes heuristic
    pub max_normal_system: HeuristicSummary,
    /// Per-attribute top-rank heuristic
    pub max_individual_attributes_system: BTreeMap<AttributeTag, HeuristicSummary>,
}

impl From<&BacktestTally> for BacktestSummary {
    fn from(tally: &BacktestTally) -> Self {
        Self {
            total_races: tally.total_races,
            eligible_races: tally.eligible_races,
            max_normal_system: tally.sum.summarize(),
            max_individual_attributes_system: tally
                .attributes
                .iter()
                .map(|(tag, t)| (*tag, t.summarize()))
                .collect(),
        }
    }
}

impl BacktestSummary {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let mut out = format!(
            r#"
══════════════════════════════════════════════════════
               BACKTEST RESULTS
══════════════════════════════════════════════════════

RACES
───────────────────────────────────────────────────────
Total Races:      {}
Eligible Races:   {}

MAX NORMALIZED SUM
───────────────────────────────────────────────────────
Considered:       {}
Winners Picked:   {} ({:.1}%)
Places Picked:    {} ({:.1}%)

PER ATTRIBUTE
───────────────────────────────────────────────────────
ATTR   CONSIDERED    WINS      WIN%   PLACES    PLACE%
"#,
            self.total_races,
            self.eligible_races,
            self.max_normal_system.races_considered,
            self.max_normal_system.outright_winners_picked,
            self.max_normal_system.outright_winners_percentage,
            self.max_normal_system.places_picked,
            self.max_normal_system.places_percentage,
        );

        for (tag, s) in &self.max_individual_attributes_system {
            let _ = writeln!(
                out,
                "{:<6} {:>10} {:>7} {:>8.1}% {:>8} {:>8.1}%",
                tag.key(),
                s.races_considered,
                s.outright_winners_picked,
                s.outright_winners_percentage,
                s.places_picked,
                s.places_percentage,
            );
        }
        out.push_str("══════════════════════════════════════════════════════\n");
        out
    }
}
