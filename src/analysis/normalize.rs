//! Attribute normalization across a race field

use crate::race::{AttributeTag, RaceRecord};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Scale applied to a horse's share of the field total
pub const NORMALIZED_SCALE: Decimal = dec!(1000);

/// Coerce scraped text to a number.
///
/// Surrounding whitespace, a leading `$` and thousands separators are
/// ignored. Empty or non-numeric text is absent.
pub fn coerce_number(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Round half up, `floor(x + 0.5)`
pub fn round_half_up(value: Decimal) -> i64 {
    (value + dec!(0.5)).floor().to_i64().unwrap_or(0)
}

/// A horse's share of the field total for one attribute, scaled to 1000.
///
/// Returns 0 when either side is absent or zero.
pub fn normalize(value: Option<Decimal>, total: Option<Decimal>) -> i64 {
    match (value, total) {
        (Some(value), Some(total)) if !value.is_zero() && !total.is_zero() => value
            .checked_div(total)
            .and_then(|share| share.checked_mul(NORMALIZED_SCALE))
            .map(round_half_up)
            .unwrap_or(0),
        _ => 0,
    }
}

/// A horse after normalization against its field
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHorse {
    pub card_number: String,
    pub finishing_position: u32,
    /// Normalized value per scored attribute
    pub values: BTreeMap<AttributeTag, i64>,
    /// Sum of the normalized values
    pub normalized_sum: i64,
    /// Whether the horse carries a positive NR rating
    pub rated: bool,
}

impl NormalizedHorse {
    /// Normalized value for a tag; unscored tags read as 0
    pub fn value(&self, tag: AttributeTag) -> i64 {
        self.values.get(&tag).copied().unwrap_or(0)
    }
}

/// A race field after normalization
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRace {
    pub race_id: String,
    /// Horses in original field order
    pub horses: Vec<NormalizedHorse>,
    pub horse_count: usize,
    /// Highest normalized sum in the field (0 for an empty field)
    pub max_normalized_sum: i64,
    /// Finishing position of the first horse reaching the max sum
    pub max_sum_finishing_position: Option<u32>,
}

/// Normalize every scored attribute of every horse against the field total
pub fn normalize_race(race: &RaceRecord, attributes: &[AttributeTag]) -> NormalizedRace {
    let raw: Vec<BTreeMap<AttributeTag, Decimal>> = race
        .horses
        .iter()
        .map(|horse| {
            attributes
                .iter()
                .filter_map(|tag| horse.raw(*tag).and_then(coerce_number).map(|v| (*tag, v)))
                .collect()
        })
        .collect();

    // A total that overflows leaves the tag absent for this race
    let totals: BTreeMap<AttributeTag, Decimal> = attributes
        .iter()
        .filter_map(|tag| {
            let mut values = raw.iter().filter_map(|horse| horse.get(tag));
            let first = *values.next()?;
            let total = values.try_fold(first, |total, value| total.checked_add(*value))?;
            Some((*tag, total))
        })
        .collect();

    let mut max_normalized_sum = 0;
    let mut max_sum_finishing_position = None;

    let horses: Vec<NormalizedHorse> = race
        .horses
        .iter()
        .zip(&raw)
        .map(|(horse, raw_values)| {
            let values: BTreeMap<AttributeTag, i64> = attributes
                .iter()
                .map(|tag| {
                    let value = normalize(raw_values.get(tag).copied(), totals.get(tag).copied());
                    (*tag, value)
                })
                .collect();
            let normalized_sum: i64 = values.values().sum();

            if max_sum_finishing_position.is_none() || normalized_sum > max_normalized_sum {
                max_normalized_sum = normalized_sum;
                max_sum_finishing_position = Some(horse.finishing_position);
            }

            let rated = horse
                .raw(AttributeTag::NeuralRating)
                .and_then(coerce_number)
                .is_some_and(|nr| nr > Decimal::ZERO);

            NormalizedHorse {
                card_number: horse.card_number.clone(),
                finishing_position: horse.finishing_position,
                values,
                normalized_sum,
                rated,
            }
        })
        .collect();

    NormalizedRace {
        race_id: race.race_id.clone(),
        horse_count: horses.len(),
        horses,
        max_normalized_sum,
        max_sum_finishing_position,
    }
}
