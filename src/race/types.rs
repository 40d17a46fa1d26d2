//! Race, horse and meeting types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Finishing position recorded when a horse did not place or has no result
pub const UNPLACED: u32 = 99;

/// A scraped table row: header label -> trimmed cell text
pub type TableRow = BTreeMap<String, String>;

/// Tagged attribute columns published on the form page
///
///  NR  - Neural rating
///  CP  - Career performance assessment based on weight/class algorithms
///  HCP - Handicap rating
///  CF  - Current form measured by class/weight algorithms
///  TIM - Time assessment
///  SCR - Scratching flag
///  JA  - Jockey ability
///  TA  - Trainer ability
///  JT  - Jockey/trainer combination
///  BP  - Barrier position (course & distance)
///  WET - Wet track performance
///  CRS - Course suitability
///  D   - Distance suitability
///  $   - Prizemoney earned
///  DLR - Days since last run
///  FP  - Finishing position (outcome, never scored)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeTag {
    #[serde(rename = "NR")]
    NeuralRating,
    #[serde(rename = "CP")]
    CareerPerformance,
    #[serde(rename = "HCP")]
    Handicap,
    #[serde(rename = "CF")]
    CurrentForm,
    #[serde(rename = "TIM")]
    TimeAssessment,
    #[serde(rename = "SCR")]
    Scratching,
    #[serde(rename = "JA")]
    JockeyAbility,
    #[serde(rename = "TA")]
    TrainerAbility,
    #[serde(rename = "JT")]
    JockeyTrainer,
    #[serde(rename = "BP")]
    BarrierPosition,
    #[serde(rename = "WET")]
    WetTrack,
    #[serde(rename = "CRS")]
    CourseSuitability,
    #[serde(rename = "D")]
    DistanceSuitability,
    #[serde(rename = "$")]
    Prizemoney,
    #[serde(rename = "DLR")]
    DaysSinceLastRun,
    #[serde(rename = "FP")]
    FinishingPosition,
}

impl AttributeTag {
    /// Every tag that feeds the scoring heuristics, in column order
    pub const PREDICTORS: [AttributeTag; 15] = [
        AttributeTag::NeuralRating,
        AttributeTag::CareerPerformance,
        AttributeTag::Handicap,
        AttributeTag::CurrentForm,
        AttributeTag::TimeAssessment,
        AttributeTag::Scratching,
        AttributeTag::JockeyAbility,
        AttributeTag::TrainerAbility,
        AttributeTag::JockeyTrainer,
        AttributeTag::BarrierPosition,
        AttributeTag::WetTrack,
        AttributeTag::CourseSuitability,
        AttributeTag::DistanceSuitability,
        AttributeTag::Prizemoney,
        AttributeTag::DaysSinceLastRun,
    ];

    /// Stable display key, used as the parsed column header and output field name
    pub fn key(&self) -> &'static str {
        match self {
            AttributeTag::NeuralRating => "NR",
            AttributeTag::CareerPerformance => "CP",
            AttributeTag::Handicap => "HCP",
            AttributeTag::CurrentForm => "CF",
            AttributeTag::TimeAssessment => "TIM",
            AttributeTag::Scratching => "SCR",
            AttributeTag::JockeyAbility => "JA",
            AttributeTag::TrainerAbility => "TA",
            AttributeTag::JockeyTrainer => "JT",
            AttributeTag::BarrierPosition => "BP",
            AttributeTag::WetTrack => "WET",
            AttributeTag::CourseSuitability => "CRS",
            AttributeTag::DistanceSuitability => "D",
            AttributeTag::Prizemoney => "$",
            AttributeTag::DaysSinceLastRun => "DLR",
            AttributeTag::FinishingPosition => "FP",
        }
    }

    /// Whether this tag is the race outcome rather than a predictor
    pub fn is_outcome(&self) -> bool {
        matches!(self, AttributeTag::FinishingPosition)
    }
}

impl fmt::Display for AttributeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AttributeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        AttributeTag::PREDICTORS
            .iter()
            .chain(std::iter::once(&AttributeTag::FinishingPosition))
            .find(|tag| tag.key().eq_ignore_ascii_case(key))
            .copied()
            .ok_or_else(|| format!("unknown attribute tag: {}", s))
    }
}

/// Race outcome for a single horse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    /// Finished first
    Win,
    /// Finished second or third
    Place,
    /// Anything else, including no result
    None,
}

impl Outcome {
    /// Classify a finishing position
    pub fn from_position(finishing_position: u32) -> Self {
        match finishing_position {
            1 => Outcome::Win,
            2 | 3 => Outcome::Place,
            _ => Outcome::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "WIN",
            Outcome::Place => "PLACE",
            Outcome::None => "NONE",
        }
    }
}

/// One horse in a race field, as scraped from the form page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseRecord {
    /// Race-card number, the join key between form and result pages
    pub card_number: String,
    /// Finishing position merged in from the result page
    #[serde(default = "unplaced")]
    pub finishing_position: u32,
    /// Every scraped column keyed by its header label
    pub attributes: TableRow,
}

fn unplaced() -> u32 {
    UNPLACED
}

impl HorseRecord {
    /// Build a horse from a form row, reading its card number from `join_column`
    pub fn from_row(row: TableRow, join_column: &str) -> Self {
        let card_number = row.get(join_column).cloned().unwrap_or_default();
        Self {
            card_number,
            finishing_position: UNPLACED,
            attributes: row,
        }
    }

    /// Raw scraped text for a tag, if the column was present
    pub fn raw(&self, tag: AttributeTag) -> Option<&str> {
        self.attributes.get(tag.key()).map(String::as_str)
    }

    /// Outcome derived from the merged finishing position
    pub fn outcome(&self) -> Outcome {
        Outcome::from_position(self.finishing_position)
    }
}

/// A meeting discovered on the meetings page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    /// Meeting label (link text, or its position on the page when blank)
    pub id: String,
    /// Relative link to the meeting's race list
    pub link: String,
}

/// A single race: its field of horses plus the raw result rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub race_id: String,
    /// Meeting the race was discovered under, if discovery ran
    #[serde(default)]
    pub meeting: Option<String>,
    /// The race field, in form-page order
    pub horses: Vec<HorseRecord>,
    /// Raw result rows as scraped
    #[serde(default)]
    pub results: Vec<TableRow>,
    #[serde(default)]
    pub horse_count: usize,
    pub scraped_at: DateTime<Utc>,
    /// Identifier of the crawl run that produced this record
    pub crawl_run_id: Uuid,
}

impl RaceRecord {
    /// Create an empty record for a newly discovered race
    pub fn new(race_id: impl Into<String>, meeting: Option<String>, crawl_run_id: Uuid) -> Self {
        Self {
            race_id: race_id.into(),
            meeting,
            horses: vec![],
            results: vec![],
            horse_count: 0,
            scraped_at: Utc::now(),
            crawl_run_id,
        }
    }

    /// Install the form-page field
    pub fn set_field(&mut self, horses: Vec<HorseRecord>) {
        self.horse_count = horses.len();
        self.horses = horses;
    }
}
