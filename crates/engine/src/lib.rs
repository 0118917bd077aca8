// ABOUTME: Main library entry point for the pagewatch extraction engine.
// ABOUTME: Re-exports rules, strategies, the dispatcher, the batch runner and the result sinks.

//! pagewatch - periodic extraction of simple signals from configured web pages.
//!
//! Each [`SourceRule`] names a page and one of three extraction types: keyword
//! frequency counts, a keyword presence check over a listing, or a date window
//! check. A [`BatchRunner`] fetches every page in order and produces one
//! [`ExtractionResult`] per rule, never aborting on a single source's failure.
//!
//! # Example
//!
//! ```no_run
//! use pagewatch_engine::{load_rules, RunnerBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rules = load_rules("data/urls_config.json")?;
//!     let runner = RunnerBuilder::new().build()?;
//!     let batch = runner.run(&rules, chrono::Local::now().naive_local());
//!     println!("{}", serde_json::to_string_pretty(&batch)?);
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod error;
pub mod extractors;
pub mod loader;
pub mod options;
pub mod report;
pub mod resource;
pub mod result;
pub mod rule;
pub mod runner;
pub mod sink;

pub use crate::dom::ParsedDocument;
pub use crate::error::{ConfigError, ExtractError, FetchError, FetchErrorCode, SinkError};
pub use crate::extractors::{ExtractContext, RuleDispatcher, Strategy};
pub use crate::loader::{load_rules, parse_rules, DEFAULT_RULES_PATH};
pub use crate::options::{RunnerBuilder, RunnerOptions};
pub use crate::report::BatchSummary;
pub use crate::resource::{Fetcher, HttpFetcher};
pub use crate::result::{Batch, Counts, ExtractionResult, Outcome, Status};
pub use crate::rule::{
    ExtractionType, MalformedItemPolicy, RuleKind, SearchAreas, SourceRule, TypeSelectors,
};
pub use crate::runner::{BatchRunner, FixedDelay, NoDelay, Pacer};
pub use crate::sink::{JsonLinesSink, ResultSink, TelegramNotifier};
