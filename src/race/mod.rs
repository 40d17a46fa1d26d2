//! Race data model
//!
//! Horse, race and meeting records, plus the merge of result data into
//! the form field

mod merge;
mod types;

pub use merge::{merge_results, parse_finishing_position, MergeStats};
pub use types::{AttributeTag, HorseRecord, Meeting, Outcome, RaceRecord, TableRow, UNPLACED};
