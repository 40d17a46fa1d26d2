//! Meeting and race-ID discovery from listing pages

use super::table::{compile_selector, element_text};
use super::types::ParseError;
use crate::race::Meeting;
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;

/// Extract meeting links from the meetings page.
///
/// Every element matching `selector` with an `href` becomes a meeting. The
/// link text is the meeting id; blank text falls back to the 1-based
/// position of the link on the page.
pub fn extract_meetings(html: &str, selector: &str) -> Result<Vec<Meeting>, ParseError> {
    let document = Html::parse_document(html);
    let link_selector = compile_selector(selector)?;

    let meetings = document
        .select(&link_selector)
        .filter_map(|link| {
            let href = link.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            Some((element_text(link), href.to_string()))
        })
        .enumerate()
        .map(|(index, (text, link))| Meeting {
            id: if text.is_empty() {
                (index + 1).to_string()
            } else {
                text
            },
            link,
        })
        .collect();

    Ok(meetings)
}

/// Extract race IDs from a meeting's race list.
///
/// Inspects the `onclick` and `href` attributes of every element matching
/// `selector`; the first capture group of `pattern` is the race ID.
/// Duplicates are dropped, first-seen order is kept.
pub fn extract_race_ids(
    html: &str,
    selector: &str,
    pattern: &Regex,
) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);
    let link_selector = compile_selector(selector)?;

    let mut seen = HashSet::new();
    let mut race_ids = Vec::new();

    for link in document.select(&link_selector) {
        let attrs = ["onclick", "href"]
            .iter()
            .filter_map(|name| link.value().attr(name));

        for payload in attrs {
            let Some(id) = pattern
                .captures(payload)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
            else {
                continue;
            };
            if seen.insert(id.clone()) {
                race_ids.push(id);
            }
            break;
        }
    }

    Ok(race_ids)
}
