// ABOUTME: BatchRunner walks the configured rules in order: fetch, pause, dispatch, record.
// ABOUTME: Every rule yields exactly one ExtractionResult; the Pacer controls the courtesy delay.

use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::extractors::{ExtractContext, RuleDispatcher};
use crate::resource::Fetcher;
use crate::result::{Batch, ExtractionResult, Outcome, FETCH_FAILED, TIMESTAMP_FORMAT};
use crate::rule::SourceRule;

/// Rate-limit policy applied between fetches.
pub trait Pacer {
    fn pause(&self);
}

impl<P: Pacer + ?Sized> Pacer for &P {
    fn pause(&self) {
        (**self).pause()
    }
}

/// Sleeps for a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Pacer for FixedDelay {
    fn pause(&self) {
        if !self.0.is_zero() {
            thread::sleep(self.0);
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Pacer for NoDelay {
    fn pause(&self) {}
}

/// Runs one batch of rules sequentially.
///
/// The delay is applied only after a successful fetch, right before the
/// document is handed to the dispatcher. A failed fetch moves straight on to
/// the next rule.
pub struct BatchRunner<F, P> {
    fetcher: F,
    pacer: P,
    dispatcher: RuleDispatcher,
}

impl<F: Fetcher, P: Pacer> BatchRunner<F, P> {
    pub fn new(fetcher: F, pacer: P) -> Self {
        Self {
            fetcher,
            pacer,
            dispatcher: RuleDispatcher::new(),
        }
    }

    /// Use a custom dispatcher (for example with extra strategies registered).
    pub fn with_dispatcher(mut self, dispatcher: RuleDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Processes `rules` in order. `started_at` stamps every result and is the
    /// reference instant for window checks.
    pub fn run(&self, rules: &[SourceRule], started_at: NaiveDateTime) -> Batch {
        let timestamp = started_at.format(TIMESTAMP_FORMAT).to_string();
        let ctx = ExtractContext {
            reference_date: started_at.date(),
        };
        let mut batch = Batch::new(timestamp.clone());
        if rules.is_empty() {
            return batch;
        }

        info!(rules = rules.len(), %timestamp, "starting batch");
        batch.results.reserve(rules.len());

        for rule in rules {
            info!(rule = %rule.name, url = %rule.url, "processing");
            let outcome = match self.fetcher.fetch(&rule.url) {
                Ok(document) => {
                    self.pacer.pause();
                    self.dispatcher.dispatch(rule, &document, &ctx)
                }
                Err(err) => {
                    warn!(rule = %rule.name, error = %err, "fetch failed");
                    Outcome::error(FETCH_FAILED)
                }
            };
            batch
                .results
                .push(ExtractionResult::new(timestamp.clone(), rule, outcome));
        }

        info!(
            total = batch.len(),
            failed = batch.failed().count(),
            "batch finished"
        );
        batch
    }
}
