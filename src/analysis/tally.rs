//! Backtest accounting

use super::normalize::round_half_up;
use crate::race::{AttributeTag, Outcome};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Percentage to one decimal place, 0 when nothing was considered
pub fn percentage(picked: u64, considered: u64) -> Decimal {
    if considered == 0 {
        return Decimal::ZERO;
    }
    let per_mille = Decimal::from(picked) * Decimal::from(1000) / Decimal::from(considered);
    Decimal::new(round_half_up(per_mille), 1)
}

/// Counters for one heuristic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeuristicTally {
    pub races_considered: u64,
    pub outright_winners_picked: u64,
    pub places_picked: u64,
}

impl HeuristicTally {
    /// Record one race's pick; `None` leaves the tally untouched
    pub fn record(&mut self, pick: Option<Outcome>) {
        let Some(outcome) = pick else {
            return;
        };
        self.races_considered += 1;
        match outcome {
            Outcome::Win => {
                self.outright_winners_picked += 1;
                self.places_picked += 1;
            }
            Outcome::Place => self.places_picked += 1,
            Outcome::None => {}
        }
    }

    pub fn outright_winners_percentage(&self) -> Decimal {
        percentage(self.outright_winners_picked, self.races_considered)
    }

    pub fn places_percentage(&self) -> Decimal {
        percentage(self.places_picked, self.races_considered)
    }

    /// Finalize into counters plus percentages
    pub fn summarize(&self) -> HeuristicSummary {
        HeuristicSummary {
            races_considered: self.races_considered,
            outright_winners_picked: self.outright_winners_picked,
            places_picked: self.places_picked,
            outright_winners_percentage: self.outright_winners_percentage(),
            places_percentage: self.places_percentage(),
        }
    }
}

/// Finalized heuristic result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeuristicSummary {
    pub races_considered: u64,
    pub outright_winners_picked: u64,
    pub places_picked: u64,
    pub outright_winners_percentage: Decimal,
    pub places_percentage: Decimal,
}

/// Aggregate counters for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BacktestTally {
    /// Races read from the store
    pub total_races: u64,
    /// Races passing the field-size rule
    pub eligible_races: u64,
    /// Sum heuristic counters
    pub sum: HeuristicTally,
    /// Per-attribute heuristic counters
    pub attributes: BTreeMap<AttributeTag, HeuristicTally>,
}

impl BacktestTally {
    /// Fresh tally with a zeroed counter for every scored attribute
    pub fn new(attributes: &[AttributeTag]) -> Self {
        Self {
            attributes: attributes
                .iter()
                .map(|tag| (*tag, HeuristicTally::default()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn record_attribute(&mut self, tag: AttributeTag, pick: Option<Outcome>) {
        self.attributes.entry(tag).or_default().record(pick);
    }
}
