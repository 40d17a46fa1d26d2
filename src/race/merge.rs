//! Joins result rows into the form field on the race-card number

use super::types::{RaceRecord, TableRow, UNPLACED};
use std::collections::HashMap;

/// Counts from a single merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Form horses that found a result row
    pub matched: usize,
    /// Form horses with no result row (recorded as unplaced)
    pub unmatched: usize,
}

/// Parse finishing-position text; a leading `=` marks a dead heat
pub fn parse_finishing_position(text: &str) -> Option<u32> {
    let trimmed = text.trim().trim_start_matches('=').trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Merge result rows into the race's field.
///
/// Each form horse is looked up by its card number in `results`; the
/// finishing position is copied onto the horse (and into its attribute
/// map under `position_column`). Horses missing from the results, or with
/// unparsable positions, are recorded as [`UNPLACED`].
pub fn merge_results(
    race: &mut RaceRecord,
    results: Vec<TableRow>,
    join_column: &str,
    position_column: &str,
) -> MergeStats {
    let by_card: HashMap<&str, &TableRow> = results
        .iter()
        .filter_map(|row| {
            row.get(join_column)
                .map(|card| card.trim())
                .filter(|card| !card.is_empty())
                .map(|card| (card, row))
        })
        .collect();

    let mut stats = MergeStats::default();

    for horse in &mut race.horses {
        let position_text = by_card
            .get(horse.card_number.trim())
            .and_then(|row| row.get(position_column));

        match position_text {
            Some(text) => {
                stats.matched += 1;
                horse.finishing_position = parse_finishing_position(text).unwrap_or(UNPLACED);
                horse
                    .attributes
                    .insert(position_column.to_string(), text.clone());
            }
            None => {
                stats.unmatched += 1;
                horse.finishing_position = UNPLACED;
            }
        }
    }

    race.results = results;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::HorseRecord;
    use uuid::Uuid;

    fn row(pairs: &[(&str, &str)]) -> TableRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn race_with_cards(cards: &[&str]) -> RaceRecord {
        let mut race = RaceRecord::new("547374", None, Uuid::new_v4());
        race.set_field(
            cards
                .iter()
                .map(|c| HorseRecord::from_row(row(&[("TAB", c)]), "TAB"))
                .collect(),
        );
        race
    }

    #[test]
    fn test_parse_finishing_position() {
        assert_eq!(parse_finishing_position("1"), Some(1));
        assert_eq!(parse_finishing_position(" 3 "), Some(3));
        assert_eq!(parse_finishing_position("=2"), Some(2));
        assert_eq!(parse_finishing_position(""), None);
        assert_eq!(parse_finishing_position("SCR"), None);
    }

    #[test]
    fn test_unmatched_horse_is_unplaced() {
        let mut race = race_with_cards(&["1", "2"]);
        let results = vec![row(&[("TAB", "2"), ("FP", "1")])];

        let stats = merge_results(&mut race, results, "TAB", "FP");

        assert_eq!(stats, MergeStats { matched: 1, unmatched: 1 });
        assert_eq!(race.horses[0].finishing_position, UNPLACED);
        assert_eq!(race.horses[1].finishing_position, 1);
        assert_eq!(race.horses[1].attributes.get("FP").unwrap(), "1");
        assert!(race.horses[0].attributes.get("FP").is_none());
        assert_eq!(race.results.len(), 1);
    }

    #[test]
    fn test_non_numeric_position_is_unplaced() {
        let mut race = race_with_cards(&["5"]);
        let results = vec![row(&[("TAB", "5"), ("FP", "FF")])];

        merge_results(&mut race, results, "TAB", "FP");

        assert_eq!(race.horses[0].finishing_position, UNPLACED);
    }

    #[test]
    fn test_result_rows_without_card_number_are_ignored() {
        let mut race = race_with_cards(&["1"]);
        let results = vec![row(&[("FP", "1")]), row(&[("TAB", " "), ("FP", "2")])];

        let stats = merge_results(&mut race, results, "TAB", "FP");

        assert_eq!(stats.matched, 0);
        assert_eq!(race.horses[0].finishing_position, UNPLACED);
    }

    #[test]
    fn test_custom_columns() {
        let mut race = RaceRecord::new("1", None, Uuid::new_v4());
        race.set_field(vec![HorseRecord::from_row(row(&[("No", "7")]), "No")]);
        let results = vec![row(&[("No", "7"), ("Pos", "3")])];

        merge_results(&mut race, results, "No", "Pos");

        assert_eq!(race.horses[0].finishing_position, 3);
    }
}
