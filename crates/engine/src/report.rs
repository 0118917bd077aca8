// ABOUTME: Batch summary (successful vs failed sources) and the notification messages built from it.
// ABOUTME: Messages use Telegram's HTML parse mode; names are escaped.

use std::fmt::Write;

use crate::result::Batch;

/// Success/failure tally of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub timestamp: String,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub failed_names: Vec<String>,
}

impl BatchSummary {
    pub fn from_batch(batch: &Batch) -> Self {
        let failed_names: Vec<String> = batch.failed().map(|r| r.name.clone()).collect();
        Self {
            timestamp: batch.timestamp.clone(),
            total: batch.len(),
            successful: batch.len() - failed_names.len(),
            failed: failed_names.len(),
            failed_names,
        }
    }

    /// Summary message sent after a completed run.
    pub fn message(&self) -> String {
        let mut msg = format!(
            "📊 <b>Scraper summary</b>\n\n📅 {}\n\n✅ Successful: {}\n❌ Failed: {}\n",
            escape_html(&self.timestamp),
            self.successful,
            self.failed
        );
        if !self.failed_names.is_empty() {
            msg.push_str("\n<b>Sources with errors:</b>\n");
            for name in &self.failed_names {
                let _ = writeln!(msg, "• {}", escape_html(name));
            }
        }
        msg
    }
}

/// Message sent when the run could not complete at all.
pub fn failure_message(error: &str, timestamp: &str) -> String {
    format!(
        "❌ <b>Scraper error</b>\n\n📅 Date: {}\n⚠️ Error: {}\n",
        escape_html(timestamp),
        escape_html(error)
    )
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Counts, ExtractionResult, Outcome, Status, FETCH_FAILED};
    use crate::rule::SourceRule;
    use pretty_assertions::assert_eq;

    fn batch() -> Batch {
        let ts = "2025-01-15 20:00:00";
        let mut batch = Batch::new(ts);
        let ok = SourceRule::frequency("Blog", "https://a.test", ["x"]);
        let bad = SourceRule::frequency("Jobs <EU>", "https://b.test", ["x"]);
        let window = SourceRule::frequency("Grants", "https://c.test", ["x"]);
        batch.results.push(ExtractionResult::new(ts, &ok, Outcome::Counts(Counts::new())));
        batch.results.push(ExtractionResult::new(ts, &bad, Outcome::error(FETCH_FAILED)));
        batch.results.push(ExtractionResult::new(ts, &window, Outcome::Status(Status::Error)));
        batch
    }

    #[test]
    fn error_status_counts_as_successful_fetch() {
        let summary = BatchSummary::from_batch(&batch());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failed_names, vec!["Jobs <EU>".to_string()]);
    }

    #[test]
    fn message_lists_failed_sources_escaped() {
        let msg = BatchSummary::from_batch(&batch()).message();
        assert!(msg.contains("✅ Successful: 2"));
        assert!(msg.contains("❌ Failed: 1"));
        assert!(msg.contains("• Jobs &lt;EU&gt;"));
    }

    #[test]
    fn failure_message_includes_reason() {
        let msg = failure_message("malformed configuration", "2025-01-15 20:00:00");
        assert!(msg.contains("⚠️ Error: malformed configuration"));
    }
}
