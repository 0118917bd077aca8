// ABOUTME: Keyword presence check over the items of a listing container.
// ABOUTME: Answers YES on the first item mentioning a keyword, NO otherwise, ERROR if the container is gone.

use tracing::debug;

use crate::dom::ParsedDocument;
use crate::error::ExtractError;
use crate::extractors::{required, ExtractContext, Strategy};
use crate::result::{Outcome, Status};
use crate::rule::SourceRule;

/// Looks for a listing whose text mentions any of the rule's keywords.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordPresenceCheck;

impl Strategy for KeywordPresenceCheck {
    fn extract(
        &self,
        document: &ParsedDocument,
        rule: &SourceRule,
        _ctx: &ExtractContext,
    ) -> Result<Outcome, ExtractError> {
        let container_css = required(&rule.selectors.container, "container")?;
        let item_css = required(&rule.selectors.item, "item")?;

        match find_match(document, container_css, item_css, &rule.keywords) {
            Ok(found) => Ok(Outcome::Status(Status::from(found))),
            Err(ExtractError::StructuralMismatch(reason)) => {
                debug!(rule = %rule.name, %reason, "presence check layout mismatch");
                Ok(Outcome::Status(Status::Error))
            }
            Err(err) => Err(err),
        }
    }
}

fn find_match(
    document: &ParsedDocument,
    container_css: &str,
    item_css: &str,
    keywords: &[String],
) -> Result<bool, ExtractError> {
    let container = document
        .select_first(container_css)?
        .ok_or_else(|| ExtractError::structural(format!("container {} not found", container_css)))?;

    let needles: Vec<String> = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| k.to_lowercase())
        .collect();

    for item in document.select_in(container, item_css)? {
        let text = ParsedDocument::element_text(item).to_lowercase();
        if needles.iter().any(|n| text.contains(n.as_str())) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{ExtractionType, RuleKind, TypeSelectors};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const LISTINGS: &str = r#"
        <div id="listings">
            <a class="listing" href="/1">Junior Python Developer</a>
            <a class="listing" href="/2">Senior RUST Engineer</a>
        </div>
        <a class="listing" href="/3">Go Developer</a>
    "#;

    fn rule(keywords: &[&str]) -> SourceRule {
        SourceRule::frequency("jobs", "u", keywords.iter().copied())
            .with_kind(RuleKind::Known(ExtractionType::KeywordPresence))
            .with_selectors(TypeSelectors {
                container: Some("#listings".to_string()),
                item: Some("a.listing".to_string()),
                ..Default::default()
            })
    }

    fn check(html: &str, rule: &SourceRule) -> Result<Outcome, ExtractError> {
        let ctx = ExtractContext {
            reference_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        };
        KeywordPresenceCheck.extract(&ParsedDocument::parse(html), rule, &ctx)
    }

    #[test]
    fn yes_when_an_item_mentions_keyword() {
        assert_eq!(check(LISTINGS, &rule(&["rust"])), Ok(Outcome::Status(Status::Yes)));
    }

    #[test]
    fn no_when_only_items_outside_container_match() {
        assert_eq!(check(LISTINGS, &rule(&["go developer"])), Ok(Outcome::Status(Status::No)));
    }

    #[test]
    fn error_status_when_container_missing() {
        assert_eq!(
            check("<div id='other'></div>", &rule(&["rust"])),
            Ok(Outcome::Status(Status::Error))
        );
    }

    #[test]
    fn no_when_container_is_empty() {
        assert_eq!(
            check("<div id='listings'></div>", &rule(&["rust"])),
            Ok(Outcome::Status(Status::No))
        );
    }

    #[test]
    fn missing_selector_is_configuration_error() {
        let mut r = rule(&["rust"]);
        r.selectors.container = None;
        assert_eq!(check(LISTINGS, &r), Err(ExtractError::MissingSelector("container")));
    }
}
