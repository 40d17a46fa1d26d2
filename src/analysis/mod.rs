//! Normalization and backtesting
//!
//! Rescales each race field, evaluates the scoring heuristics and tallies
//! how often their picks won or placed

mod heuristics;
mod normalize;
mod summary;
mod tally;

pub use heuristics::{
    attribute_pick, rank_by_attribute, rank_by_sum, sum_pick, FieldSizeRule,
};
pub use normalize::{
    coerce_number, normalize, normalize_race, round_half_up, NormalizedHorse, NormalizedRace,
};
pub use summary::BacktestSummary;
pub use tally::{percentage, BacktestTally, HeuristicSummary, HeuristicTally};

use crate::config::AnalysisConfig;
use crate::race::RaceRecord;

/// Evaluates the heuristics over a set of stored races
#[derive(Debug, Clone)]
pub struct Backtester {
    config: AnalysisConfig,
    field_size: FieldSizeRule,
}

impl Backtester {
    pub fn new(config: AnalysisConfig) -> Self {
        let field_size = FieldSizeRule::from(&config);
        Self { config, field_size }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Normalize a race if its field size is eligible
    pub fn normalize_eligible(&self, race: &RaceRecord) -> Option<NormalizedRace> {
        if !self.field_size.is_eligible(race.horses.len()) {
            tracing::trace!(
                race_id = %race.race_id,
                horses = race.horses.len(),
                "Skipping race outside field-size bounds"
            );
            return None;
        }
        Some(normalize_race(race, &self.config.attributes))
    }

    /// Score one race into the tally
    pub fn record(&self, tally: &mut BacktestTally, race: &RaceRecord) {
        tally.total_races += 1;

        let Some(normalized) = self.normalize_eligible(race) else {
            return;
        };
        tally.eligible_races += 1;

        tally
            .sum
            .record(sum_pick(&normalized, self.config.sum_threshold));

        for tag in &self.config.attributes {
            let pick = attribute_pick(&normalized, *tag, self.config.attribute_threshold);
            tally.record_attribute(*tag, pick);
        }
    }

    /// Run a full backtest; the tally starts from zero on every call
    pub fn run(&self, races: &[RaceRecord]) -> BacktestSummary {
        let mut tally = BacktestTally::new(&self.config.attributes);
        for race in races {
            self.record(&mut tally, race);
        }

        let summary = BacktestSummary::from(&tally);
        tracing::info!(
            total_races = summary.total_races,
            eligible_races = summary.eligible_races,
            considered = summary.max_normal_system.races_considered,
            win_pct = %summary.max_normal_system.outright_winners_percentage,
            place_pct = %summary.max_normal_system.places_percentage,
            "Backtest complete"
        );
        summary
    }
}
