//! Scoring heuristics
//!
//! Both heuristics rank a normalized field and, when the top value clears
//! a threshold, take the top horse's finishing position as the pick. A
//! `None` pick means the race is not considered by that heuristic.

use super::normalize::{NormalizedHorse, NormalizedRace};
use crate::config::AnalysisConfig;
use crate::race::{AttributeTag, Outcome};

/// Horse-count eligibility, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSizeRule {
    pub min_horses: usize,
    pub max_horses: usize,
}

impl FieldSizeRule {
    pub fn new(min_horses: usize, max_horses: usize) -> Self {
        Self {
            min_horses,
            max_horses,
        }
    }

    pub fn is_eligible(&self, horse_count: usize) -> bool {
        (self.min_horses..=self.max_horses).contains(&horse_count)
    }
}

impl From<&AnalysisConfig> for FieldSizeRule {
    fn from(config: &AnalysisConfig) -> Self {
        Self::new(config.min_horses, config.max_horses)
    }
}

/// Rank horses descending by `key`; ties keep field order
fn rank_by<F>(race: &NormalizedRace, key: F) -> Vec<&NormalizedHorse>
where
    F: Fn(&NormalizedHorse) -> i64,
{
    let mut ranked: Vec<&NormalizedHorse> = race.horses.iter().collect();
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));
    ranked
}

/// Field ranked by normalized sum
pub fn rank_by_sum(race: &NormalizedRace) -> Vec<&NormalizedHorse> {
    rank_by(race, |horse| horse.normalized_sum)
}

/// Field ranked by one normalized attribute
pub fn rank_by_attribute(race: &NormalizedRace, tag: AttributeTag) -> Vec<&NormalizedHorse> {
    rank_by(race, |horse| horse.value(tag))
}

/// Sum heuristic: top horse by normalized sum, when the field max exceeds `threshold`
pub fn sum_pick(race: &NormalizedRace, threshold: i64) -> Option<Outcome> {
    if race.max_normalized_sum <= threshold {
        return None;
    }
    rank_by_sum(race)
        .first()
        .map(|top| Outcome::from_position(top.finishing_position))
}

/// Per-attribute heuristic: top horse by `tag`, when its value exceeds `threshold`
pub fn attribute_pick(race: &NormalizedRace, tag: AttributeTag, threshold: i64) -> Option<Outcome> {
    let ranked = rank_by_attribute(race, tag);
    let top = ranked.first()?;
    if top.value(tag) <= threshold {
        return None;
    }
    Some(Outcome::from_position(top.finishing_position))
}
