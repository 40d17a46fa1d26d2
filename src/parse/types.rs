//! Parsing types

use crate::race::TableRow;
use serde::Deserialize;
use thiserror::Error;

/// Parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    /// The expected table or structure is absent from the page
    #[error("Malformed document ({locator}): {reason}")]
    MalformedDocument { locator: String, reason: String },
    /// A configured CSS selector does not parse
    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
    /// A configured regular expression does not compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Identifies one table on a page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableLocator {
    /// CSS selector; the first match is used if it is a `<table>`,
    /// otherwise its nearest enclosing `<table>`
    pub selector: String,
    /// Drop body rows whose first cell is blank (spacer rows)
    #[serde(default)]
    pub skip_blank_leading_cell: bool,
}

impl TableLocator {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            skip_blank_leading_cell: false,
        }
    }

    /// Builder-style toggle for spacer-row skipping
    pub fn skipping_blank_leading_cell(mut self) -> Self {
        self.skip_blank_leading_cell = true;
        self
    }
}

/// An extracted table: ordered header labels and one record per body row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl ParsedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
