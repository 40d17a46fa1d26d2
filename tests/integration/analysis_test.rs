//! Normalization and backtest integration tests

use form_backtest::analysis::{
    normalize, percentage, sum_pick, Backtester, FieldSizeRule, NormalizedHorse, NormalizedRace,
};
use form_backtest::config::AnalysisConfig;
use form_backtest::race::{AttributeTag, HorseRecord, Outcome, RaceRecord, TableRow};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A horse carrying `value` for every predictor tag
fn uniform_horse(card: usize, finishing_position: u32, value: &str) -> HorseRecord {
    let mut row = TableRow::new();
    row.insert("TAB".to_string(), card.to_string());
    for tag in AttributeTag::PREDICTORS {
        row.insert(tag.key().to_string(), value.to_string());
    }
    let mut horse = HorseRecord::from_row(row, "TAB");
    horse.finishing_position = finishing_position;
    horse
}

fn race_of(race_id: &str, horses: Vec<HorseRecord>) -> RaceRecord {
    let mut race = RaceRecord::new(race_id, None, Uuid::new_v4());
    race.set_field(horses);
    race
}

/// Ten runners; the first is far stronger on every attribute and wins
fn standout_race() -> RaceRecord {
    let mut horses = vec![uniform_horse(1, 1, "100")];
    for card in 2..=10 {
        horses.push(uniform_horse(card, card as u32, "10"));
    }
    race_of("200001", horses)
}

fn field(race_id: &str, size: usize) -> RaceRecord {
    let horses = (1..=size)
        .map(|card| uniform_horse(card, card as u32, "10"))
        .collect();
    race_of(race_id, horses)
}

fn normalized_with_max(max_normalized_sum: i64, finishing_position: u32) -> NormalizedRace {
    NormalizedRace {
        race_id: "1".to_string(),
        horses: vec![NormalizedHorse {
            card_number: "1".to_string(),
            finishing_position,
            values: BTreeMap::new(),
            normalized_sum: max_normalized_sum,
            rated: true,
        }],
        horse_count: 1,
        max_normalized_sum,
        max_sum_finishing_position: Some(finishing_position),
    }
}

#[test]
fn test_standout_horse_is_counted_as_win_and_place() {
    let backtester = Backtester::new(AnalysisConfig::default());
    let race = standout_race();

    let normalized = backtester.normalize_eligible(&race).unwrap();
    // 100 / 190 of every attribute total
    assert_eq!(normalized.horses[0].value(AttributeTag::CareerPerformance), 526);
    assert_eq!(normalized.horses[1].value(AttributeTag::CareerPerformance), 53);
    assert_eq!(normalized.max_normalized_sum, 526 * 15);
    assert_eq!(normalized.max_sum_finishing_position, Some(1));

    let summary = backtester.run(&[race]);
    assert_eq!(summary.eligible_races, 1);

    let sum = summary.max_normal_system;
    assert_eq!(sum.races_considered, 1);
    assert_eq!(sum.outright_winners_picked, 1);
    assert_eq!(sum.places_picked, 1);
    assert_eq!(sum.outright_winners_percentage, dec!(100.0));

    for tag in AttributeTag::PREDICTORS {
        let attribute = &summary.max_individual_attributes_system[&tag];
        assert_eq!(attribute.races_considered, 1, "{}", tag);
        assert_eq!(attribute.outright_winners_picked, 1, "{}", tag);
    }
}

#[test]
fn test_field_size_bounds_are_inclusive() {
    let rule = FieldSizeRule::from(&AnalysisConfig::default());
    assert!(!rule.is_eligible(7));
    assert!(!rule.is_eligible(8));
    assert!(rule.is_eligible(9));
    assert!(rule.is_eligible(14));
    assert!(!rule.is_eligible(15));

    let backtester = Backtester::new(AnalysisConfig::default());
    let summary = backtester.run(&[field("1", 7), field("2", 9), field("3", 14)]);
    assert_eq!(summary.total_races, 3);
    assert_eq!(summary.eligible_races, 2);
}

#[test]
fn test_sum_threshold_gates_consideration() {
    assert_eq!(sum_pick(&normalized_with_max(2700, 1), 2600), Some(Outcome::Win));
    assert_eq!(sum_pick(&normalized_with_max(2500, 1), 2600), None);
    assert_eq!(sum_pick(&normalized_with_max(2600, 1), 2600), None);
}

#[test]
fn test_even_field_is_not_considered_by_sum_heuristic() {
    // Ten equal runners: every value is 100 and every sum 1500
    let backtester = Backtester::new(AnalysisConfig::default());
    let summary = backtester.run(&[field("1", 10)]);

    assert_eq!(summary.eligible_races, 1);
    assert_eq!(summary.max_normal_system.races_considered, 0);
    assert_eq!(summary.max_normal_system.outright_winners_percentage, Decimal::ZERO);
    assert!(summary
        .max_individual_attributes_system
        .values()
        .all(|s| s.races_considered == 0));
}

#[test]
fn test_attributes_pick_independently() {
    let config = AnalysisConfig {
        min_horses: 3,
        max_horses: 3,
        attributes: vec![AttributeTag::CareerPerformance, AttributeTag::JockeyAbility],
        ..AnalysisConfig::default()
    };
    let backtester = Backtester::new(config);

    let horse = |card: usize, fp: u32, cp: &str, ja: &str| {
        let mut row = TableRow::new();
        row.insert("TAB".to_string(), card.to_string());
        row.insert("CP".to_string(), cp.to_string());
        row.insert("JA".to_string(), ja.to_string());
        let mut horse = HorseRecord::from_row(row, "TAB");
        horse.finishing_position = fp;
        horse
    };

    // CP picks card 1 (winner); JA picks card 3 (unplaced)
    let race = race_of(
        "1",
        vec![horse(1, 1, "60", "10"), horse(2, 2, "20", "10"), horse(3, 7, "20", "80")],
    );
    let summary = backtester.run(&[race]);

    let cp = &summary.max_individual_attributes_system[&AttributeTag::CareerPerformance];
    let ja = &summary.max_individual_attributes_system[&AttributeTag::JockeyAbility];
    assert_eq!((cp.races_considered, cp.outright_winners_picked, cp.places_picked), (1, 1, 1));
    assert_eq!((ja.races_considered, ja.outright_winners_picked, ja.places_picked), (1, 0, 0));
}

#[test]
fn test_normalized_values_stay_in_range() {
    let backtester = Backtester::new(AnalysisConfig::default());
    let normalized = backtester.normalize_eligible(&standout_race()).unwrap();

    for horse in &normalized.horses {
        for value in horse.values.values() {
            assert!((0..=1000).contains(value));
        }
    }
    assert_eq!(normalize(Some(dec!(1)), Some(dec!(8))), 125);
}

#[test]
fn test_percentage_with_nothing_considered() {
    assert_eq!(percentage(0, 0), Decimal::ZERO);
}
