// ABOUTME: RuleDispatcher maps each rule's extraction type to exactly one strategy.
// ABOUTME: Validates keyword configuration and converts every strategy failure into an error outcome.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::dom::ParsedDocument;
use crate::error::ExtractError;
use crate::extractors::{
    DateWindowCheck, ExtractContext, KeywordFrequencyCount, KeywordPresenceCheck, Strategy,
};
use crate::result::Outcome;
use crate::rule::{ExtractionType, RuleKind, SourceRule};

/// Message recorded when a strategy panics.
pub const INTERNAL_PANIC: &str = "internal panic during extraction";

/// Selects and runs the strategy for a rule.
pub struct RuleDispatcher {
    strategies: HashMap<ExtractionType, Box<dyn Strategy>>,
}

impl RuleDispatcher {
    /// A dispatcher with the three built-in strategies registered.
    pub fn new() -> Self {
        let mut dispatcher = Self {
            strategies: HashMap::new(),
        };
        dispatcher.register(ExtractionType::DateWindow, DateWindowCheck);
        dispatcher.register(ExtractionType::KeywordPresence, KeywordPresenceCheck);
        dispatcher.register(ExtractionType::KeywordFrequency, KeywordFrequencyCount);
        dispatcher
    }

    /// Replaces the strategy used for `kind`.
    pub fn register(&mut self, kind: ExtractionType, strategy: impl Strategy + 'static) {
        self.strategies.insert(kind, Box::new(strategy));
    }

    /// Checks that the rule can be handed to a strategy at all.
    ///
    /// Runs before the document is looked at.
    pub fn validate<'r>(&self, rule: &'r SourceRule) -> Result<&'r ExtractionType, ExtractError> {
        let kind = match &rule.kind {
            RuleKind::Known(kind) => kind,
            RuleKind::Unrecognized(raw) => {
                return Err(ExtractError::UnknownExtractionType(raw.clone()))
            }
        };
        if kind.requires_keywords() && rule.keywords.is_empty() {
            return Err(ExtractError::NoKeywordsConfigured);
        }
        Ok(kind)
    }

    /// Runs the rule against the document. Never fails: problems become `Outcome::Error`.
    pub fn dispatch(
        &self,
        rule: &SourceRule,
        document: &ParsedDocument,
        ctx: &ExtractContext,
    ) -> Outcome {
        let kind = match self.validate(rule) {
            Ok(kind) => kind,
            Err(err) => {
                warn!(rule = %rule.name, error = %err, "rule rejected");
                return Outcome::error(err.to_string());
            }
        };

        let Some(strategy) = self.strategies.get(kind) else {
            return Outcome::error(ExtractError::UnknownExtractionType(kind.to_string()).to_string());
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(document, rule, ctx)));
        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!(rule = %rule.name, error = %err, "extraction failed");
                Outcome::error(err.to_string())
            }
            Err(_) => {
                warn!(rule = %rule.name, "strategy panicked");
                Outcome::error(INTERNAL_PANIC)
            }
        }
    }
}

impl Default for RuleDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Status;
    use crate::rule::TypeSelectors;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ctx() -> ExtractContext {
        ExtractContext {
            reference_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        }
    }

    /// Records whether it was invoked.
    struct Probe(Rc<Cell<bool>>);

    impl Strategy for Probe {
        fn extract(
            &self,
            _document: &ParsedDocument,
            _rule: &SourceRule,
            _ctx: &ExtractContext,
        ) -> Result<Outcome, ExtractError> {
            self.0.set(true);
            Ok(Outcome::Status(Status::Yes))
        }
    }

    struct Panics;

    impl Strategy for Panics {
        fn extract(
            &self,
            _document: &ParsedDocument,
            _rule: &SourceRule,
            _ctx: &ExtractContext,
        ) -> Result<Outcome, ExtractError> {
            panic!("boom")
        }
    }

    #[test]
    fn empty_keywords_rejected_without_running_strategy() {
        let called = Rc::new(Cell::new(false));
        let mut dispatcher = RuleDispatcher::new();
        dispatcher.register(ExtractionType::KeywordFrequency, Probe(called.clone()));

        let rule = SourceRule::frequency("p", "u", Vec::<String>::new());
        let outcome = dispatcher.dispatch(&rule, &ParsedDocument::parse("<p>x</p>"), &ctx());

        assert_eq!(outcome, Outcome::error("no keywords configured"));
        assert!(!called.get());
    }

    #[test]
    fn presence_also_requires_keywords() {
        let rule = SourceRule::frequency("p", "u", Vec::<String>::new())
            .with_kind(RuleKind::Known(ExtractionType::KeywordPresence));
        let outcome = RuleDispatcher::new().dispatch(&rule, &ParsedDocument::parse(""), &ctx());
        assert_eq!(outcome, Outcome::error("no keywords configured"));
    }

    #[test]
    fn date_window_runs_without_keywords() {
        let rule = SourceRule::frequency("p", "u", Vec::<String>::new())
            .with_kind(RuleKind::Known(ExtractionType::DateWindow))
            .with_selectors(TypeSelectors {
                item: Some("div".to_string()),
                label: Some("b".to_string()),
                ..Default::default()
            });
        let outcome = RuleDispatcher::new().dispatch(&rule, &ParsedDocument::parse(""), &ctx());
        assert_eq!(outcome, Outcome::Status(Status::No));
    }

    #[test]
    fn unknown_type_is_an_error_outcome() {
        let rule = SourceRule::frequency("p", "u", ["x"])
            .with_kind(RuleKind::Unrecognized("screenshot".to_string()));
        let outcome = RuleDispatcher::new().dispatch(&rule, &ParsedDocument::parse(""), &ctx());
        assert_eq!(outcome, Outcome::error("unknown extraction type: screenshot"));
    }

    #[test]
    fn dispatches_by_type() {
        let called = Rc::new(Cell::new(false));
        let mut dispatcher = RuleDispatcher::new();
        dispatcher.register(ExtractionType::KeywordPresence, Probe(called.clone()));

        let freq = SourceRule::frequency("p", "u", ["x"]);
        let outcome = dispatcher.dispatch(&freq, &ParsedDocument::parse("<p>x x y</p>"), &ctx());
        assert!(!outcome.is_error());
        assert!(!called.get());

        let presence = freq.with_kind(RuleKind::Known(ExtractionType::KeywordPresence));
        dispatcher.dispatch(&presence, &ParsedDocument::parse(""), &ctx());
        assert!(called.get());
    }

    #[test]
    fn strategy_panic_becomes_error_outcome() {
        let mut dispatcher = RuleDispatcher::new();
        dispatcher.register(ExtractionType::KeywordFrequency, Panics);
        let rule = SourceRule::frequency("p", "u", ["x"]);
        let outcome = dispatcher.dispatch(&rule, &ParsedDocument::parse(""), &ctx());
        assert_eq!(outcome, Outcome::error(INTERNAL_PANIC));
    }

    #[test]
    fn configuration_errors_surface_as_messages() {
        let rule = SourceRule::frequency("p", "u", ["x"])
            .with_kind(RuleKind::Known(ExtractionType::KeywordPresence));
        let outcome = RuleDispatcher::new().dispatch(&rule, &ParsedDocument::parse(""), &ctx());
        assert_eq!(outcome, Outcome::error("missing selector: container"));
    }

    #[test]
    fn conflicting_counter_key_is_an_error_outcome() {
        let rule = SourceRule::frequency("p", "u", ["x", "url"]);
        let outcome =
            RuleDispatcher::new().dispatch(&rule, &ParsedDocument::parse("<p>x url</p>"), &ctx());
        assert_eq!(outcome, Outcome::error("conflicting counter key: url"));
    }
}
