// ABOUTME: Keyword frequency counting over the whole page or over named search areas.
// ABOUTME: Counts are case-insensitive, literal and non-overlapping.

use std::collections::HashSet;

use tracing::debug;

use crate::dom::ParsedDocument;
use crate::error::ExtractError;
use crate::extractors::{ExtractContext, Strategy};
use crate::result::{Counts, Outcome};
use crate::rule::{SearchAreas, SourceRule};

/// Row fields every result already carries.
pub const RESERVED_KEYS: &[&str] = &["timestamp", "url", "name", "error", "status"];

/// Counts every configured keyword, optionally per search area.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordFrequencyCount;

impl Strategy for KeywordFrequencyCount {
    fn extract(
        &self,
        document: &ParsedDocument,
        rule: &SourceRule,
        _ctx: &ExtractContext,
    ) -> Result<Outcome, ExtractError> {
        check_counter_keys(rule)?;
        let counts = match rule.search_areas.as_ref() {
            Some(areas) => count_in_areas(document, &rule.keywords, areas)?,
            None => count_keywords(&document.text().to_lowercase(), &rule.keywords, None),
        };
        Ok(Outcome::Counts(counts))
    }
}

/// Occurrences of `keyword` in `haystack`; `haystack` must already be lower-cased.
pub fn count_occurrences(haystack: &str, keyword: &str) -> u64 {
    if keyword.is_empty() {
        return 0;
    }
    haystack.matches(keyword.to_lowercase().as_str()).count() as u64
}

fn counter_key(area: Option<&str>, keyword: &str) -> String {
    match area {
        Some(label) => format!("{}_{}", label, keyword),
        None => keyword.to_string(),
    }
}

/// Every counter key must be unique within the row and must not shadow a row field.
pub fn check_counter_keys(rule: &SourceRule) -> Result<(), ExtractError> {
    let areas: Vec<Option<&str>> = match rule.search_areas.as_ref() {
        Some(areas) => areas.iter().map(|(label, _)| Some(label)).collect(),
        None => vec![None],
    };
    let mut seen = HashSet::new();
    for area in areas {
        for keyword in &rule.keywords {
            let key = counter_key(area, keyword);
            if RESERVED_KEYS.contains(&key.as_str()) || !seen.insert(key.clone()) {
                return Err(ExtractError::ConflictingCounterKey(key));
            }
        }
    }
    Ok(())
}

fn count_keywords(text: &str, keywords: &[String], area: Option<&str>) -> Counts {
    let mut counts = Counts::new();
    for keyword in keywords {
        counts.push(counter_key(area, keyword), count_occurrences(text, keyword));
    }
    counts
}

fn count_in_areas(
    document: &ParsedDocument,
    keywords: &[String],
    areas: &SearchAreas,
) -> Result<Counts, ExtractError> {
    let mut counts = Counts::new();
    for (label, css) in areas.iter() {
        let elements = document.select(css)?;
        debug!(area = label, selector = css, matches = elements.len(), "counting area");
        let area_text = elements
            .into_iter()
            .map(|el| ParsedDocument::element_text(el).to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        for (key, count) in count_keywords(&area_text, keywords, Some(label)).iter() {
            counts.push(key, count);
        }
    }
    Ok(counts)
}
