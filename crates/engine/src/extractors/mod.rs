// ABOUTME: Extraction strategies and the dispatcher that picks one per rule.
// ABOUTME: Every strategy implements the Strategy trait and returns an explicit Result.

//! Extraction strategies.
//!
//! Submodules:
//! - `frequency`: keyword frequency counts over the page or named areas.
//! - `presence`: does a listing item mention a keyword.
//! - `date_window`: does any item's date range contain the reference date.
//! - `dispatch`: maps a rule's extraction type to its strategy.

pub mod date_window;
pub mod dispatch;
pub mod frequency;
pub mod presence;

use chrono::NaiveDate;

use crate::dom::ParsedDocument;
use crate::error::ExtractError;
use crate::result::Outcome;
use crate::rule::SourceRule;

pub use date_window::DateWindowCheck;
pub use dispatch::RuleDispatcher;
pub use frequency::KeywordFrequencyCount;
pub use presence::KeywordPresenceCheck;

/// Per-batch inputs that are not part of the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractContext {
    /// Calendar date window checks compare against.
    pub reference_date: NaiveDate,
}

/// One interchangeable extraction algorithm.
pub trait Strategy {
    fn extract(
        &self,
        document: &ParsedDocument,
        rule: &SourceRule,
        ctx: &ExtractContext,
    ) -> Result<Outcome, ExtractError>;
}

/// Returns the selector or a configuration error naming it.
pub(crate) fn required<'a>(
    value: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, ExtractError> {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ExtractError::MissingSelector(name))
}
