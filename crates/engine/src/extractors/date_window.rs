// ABOUTME: Date window check: is the reference date inside any item's "start – end" range.
// ABOUTME: Dates are day/month/year; malformed items abort or are skipped per the rule's policy.

//! Date window check.
//!
//! Each item carries a label (for example `<strong>Deadline:</strong>`)
//! followed by sibling text of the form `01/02/2025 – 28/02/2025`. The check
//! answers YES as soon as one range contains the reference date.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use tracing::debug;

use crate::dom::ParsedDocument;
use crate::error::ExtractError;
use crate::extractors::{required, ExtractContext, Strategy};
use crate::result::{Outcome, Status};
use crate::rule::{MalformedItemPolicy, SourceRule};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Two day/month/year dates separated by a hyphen, en dash or em dash.
static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}/\d{1,2}/\d{4})\s*[-–—]\s*(\d{1,2}/\d{1,2}/\d{4})")
        .expect("date range pattern is valid")
});

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Parses `dd/mm/yyyy – dd/mm/yyyy` out of a label's sibling text.
pub fn parse_range(text: &str) -> Result<DateRange, ExtractError> {
    let caps = RANGE_RE
        .captures(text)
        .ok_or_else(|| ExtractError::structural(format!("no date range in {:?}", text)))?;
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|e| ExtractError::structural(format!("bad date {:?}: {}", s, e)))
    };
    Ok(DateRange {
        start: parse(&caps[1])?,
        end: parse(&caps[2])?,
    })
}

/// Checks item date windows against the batch reference date.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateWindowCheck;

impl Strategy for DateWindowCheck {
    fn extract(
        &self,
        document: &ParsedDocument,
        rule: &SourceRule,
        ctx: &ExtractContext,
    ) -> Result<Outcome, ExtractError> {
        let item_css = required(&rule.selectors.item, "item")?;
        let label_css = required(&rule.selectors.label, "label")?;
        let label_text = rule.selectors.label_text.as_deref().map(str::to_lowercase);

        let items = document.select(item_css)?;
        let mut malformed = 0usize;

        for item in &items {
            let range = item_range(document, *item, label_css, label_text.as_deref());
            match range {
                Ok(range) if range.contains(ctx.reference_date) => {
                    return Ok(Outcome::Status(Status::Yes));
                }
                Ok(_) => {}
                Err(ExtractError::StructuralMismatch(reason)) => {
                    debug!(rule = %rule.name, %reason, "malformed window item");
                    match rule.on_malformed {
                        MalformedItemPolicy::Abort => return Ok(Outcome::Status(Status::Error)),
                        MalformedItemPolicy::Skip => malformed += 1,
                    }
                }
                Err(err) => return Err(err),
            }
        }

        if !items.is_empty() && malformed == items.len() {
            return Ok(Outcome::Status(Status::Error));
        }
        Ok(Outcome::Status(Status::No))
    }
}

fn item_range(
    document: &ParsedDocument,
    item: ElementRef<'_>,
    label_css: &str,
    label_text: Option<&str>,
) -> Result<DateRange, ExtractError> {
    let label = document
        .select_in(item, label_css)?
        .into_iter()
        .find(|el| match label_text {
            Some(wanted) => ParsedDocument::element_text(*el).to_lowercase().contains(wanted),
            None => true,
        })
        .ok_or_else(|| ExtractError::structural("label not found"))?;

    let text = ParsedDocument::sibling_text(label)
        .ok_or_else(|| ExtractError::structural("no text after label"))?;
    parse_range(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{ExtractionType, RuleKind, TypeSelectors};
    use pretty_assertions::assert_eq;

    fn rule() -> SourceRule {
        SourceRule::frequency("grants", "u", Vec::<String>::new())
            .with_kind(RuleKind::Known(ExtractionType::DateWindow))
            .with_selectors(TypeSelectors {
                item: Some("div.call".to_string()),
                label: Some("strong".to_string()),
                label_text: Some("Plazo".to_string()),
                ..Default::default()
            })
    }

    fn check(html: &str, rule: &SourceRule, y: i32, m: u32, d: u32) -> Status {
        let ctx = ExtractContext {
            reference_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        };
        match DateWindowCheck.extract(&ParsedDocument::parse(html), rule, &ctx) {
            Ok(Outcome::Status(s)) => s,
            other => panic!("expected status, got {:?}", other),
        }
    }

    const TWO_CALLS: &str = r#"
        <div class="call"><span>Call A</span><strong>PLAZO:</strong> 01/03/2025 – 31/03/2025</div>
        <div class="call"><strong>Tipo:</strong> abierta <strong>Plazo:</strong> 10/01/2025 - 20/01/2025</div>
    "#;

    #[test]
    fn yes_when_reference_inside_a_window() {
        assert_eq!(check(TWO_CALLS, &rule(), 2025, 1, 15), Status::Yes);
        assert_eq!(check(TWO_CALLS, &rule(), 2025, 3, 15), Status::Yes);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        assert_eq!(check(TWO_CALLS, &rule(), 2025, 1, 20), Status::Yes);
        assert_eq!(check(TWO_CALLS, &rule(), 2025, 3, 1), Status::Yes);
    }

    #[test]
    fn no_when_reference_before_all_windows() {
        assert_eq!(check(TWO_CALLS, &rule(), 2024, 12, 1), Status::No);
    }

    #[test]
    fn no_when_there_are_no_items() {
        assert_eq!(check("<p>nothing open</p>", &rule(), 2025, 1, 15), Status::No);
    }

    #[test]
    fn malformed_only_item_is_error() {
        let html = r#"<div class="call"><strong>Plazo:</strong> 32/13/2025 – 40/14/2025</div>"#;
        assert_eq!(check(html, &rule(), 2025, 1, 15), Status::Error);
        let skip = rule().with_malformed_policy(MalformedItemPolicy::Skip);
        assert_eq!(check(html, &skip, 2025, 1, 15), Status::Error);
    }

    #[test]
    fn malformed_item_aborts_by_default() {
        let html = r#"
            <div class="call"><strong>Plazo:</strong> to be announced</div>
            <div class="call"><strong>Plazo:</strong> 10/01/2025 – 20/01/2025</div>
        "#;
        assert_eq!(check(html, &rule(), 2025, 1, 15), Status::Error);
    }

    #[test]
    fn match_before_malformed_item_wins_under_abort() {
        let html = r#"
            <div class="call"><strong>Plazo:</strong> 10/01/2025 – 20/01/2025</div>
            <div class="call"><strong>Plazo:</strong> to be announced</div>
        "#;
        assert_eq!(check(html, &rule(), 2025, 1, 15), Status::Yes);
        assert_eq!(check(html, &rule(), 2025, 6, 1), Status::Error);
    }

    #[test]
    fn skip_policy_continues_past_malformed_items() {
        let html = r#"
            <div class="call"><strong>Plazo:</strong> to be announced</div>
            <div class="call"><strong>Plazo:</strong> 10/01/2025 – 20/01/2025</div>
        "#;
        let skip = rule().with_malformed_policy(MalformedItemPolicy::Skip);
        assert_eq!(check(html, &skip, 2025, 1, 15), Status::Yes);
        assert_eq!(check(html, &skip, 2025, 6, 1), Status::No);
    }

    #[test]
    fn missing_label_counts_as_malformed() {
        let html = r#"<div class="call"><strong>Tipo:</strong> abierta</div>"#;
        assert_eq!(check(html, &rule(), 2025, 1, 15), Status::Error);
    }

    #[test]
    fn parse_range_accepts_dash_variants() {
        let expected = DateRange {
            start: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        };
        assert_eq!(parse_range("1/2/2025 – 28/02/2025").unwrap(), expected);
        assert_eq!(parse_range("01/02/2025—28/02/2025").unwrap(), expected);
        assert_eq!(parse_range("from 01/02/2025 - 28/02/2025 (CET)").unwrap(), expected);
        assert!(parse_range("01/02/2025 to 28/02/2025").is_err());
    }
}
