//! HTML table extraction

use super::types::{ParseError, ParsedTable, TableLocator};
use crate::race::TableRow;
use scraper::{ElementRef, Html, Selector};

/// Compile a CSS selector, mapping failures to [`ParseError::InvalidSelector`]
pub(crate) fn compile_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Trimmed text content of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn is_table(element: &ElementRef<'_>) -> bool {
    element.value().name().eq_ignore_ascii_case("table")
}

/// Nearest enclosing `<table>` of an element (excluding itself)
fn enclosing_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(is_table)
}

/// Text of the direct `td`/`th` children of a row
fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(element_text)
        .collect()
}

/// Extract the table identified by `locator` from raw HTML.
///
/// The first row of the table is the header row. Body rows become
/// header -> cell records; rows with no cells or only blank cells are
/// dropped, as are rows with a blank leading cell when the locator asks
/// for it. Rows of tables nested inside the located table are ignored.
pub fn extract_table(html: &str, locator: &TableLocator) -> Result<ParsedTable, ParseError> {
    let malformed = |reason: &str| ParseError::MalformedDocument {
        locator: locator.selector.clone(),
        reason: reason.to_string(),
    };

    let document = Html::parse_document(html);
    let anchor_selector = compile_selector(&locator.selector)?;
    let row_selector = compile_selector("tr")?;

    let anchor = document
        .select(&anchor_selector)
        .next()
        .ok_or_else(|| malformed("no element matches selector"))?;

    let table = if is_table(&anchor) {
        anchor
    } else {
        enclosing_table(anchor).ok_or_else(|| malformed("matched element is not inside a table"))?
    };

    let mut rows = table
        .select(&row_selector)
        .filter(|row| enclosing_table(*row).map(|t| t.id()) == Some(table.id()));

    let headers = rows
        .next()
        .map(row_cells)
        .ok_or_else(|| malformed("table has no rows"))?;

    let records = rows
        .map(row_cells)
        .filter(|cells| !cells.is_empty() && cells.iter().any(|c| !c.is_empty()))
        .filter(|cells| !(locator.skip_blank_leading_cell && cells[0].is_empty()))
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(label, _)| !label.is_empty())
                .map(|(label, cell)| (label.clone(), cell))
                .collect::<TableRow>()
        })
        .collect();

    Ok(ParsedTable {
        headers,
        rows: records,
    })
}
