//! Page parsing
//!
//! Extracts tables and discovery links from raw HTML. Everything here is
//! synchronous and free of I/O.

mod discovery;
mod table;
mod types;

pub use discovery::{extract_meetings, extract_race_ids};
pub use table::extract_table;
pub use types::{ParseError, ParsedTable, TableLocator};
