// ABOUTME: Result records produced by the engine: per-rule ExtractionResult and the run-level Batch.
// ABOUTME: Each result serializes as one flat JSON row (timestamp, url, name, then its outcome).

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::rule::SourceRule;

/// Timestamp format shared by every row of a batch.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Message recorded when a page could not be retrieved.
pub const FETCH_FAILED: &str = "Failed to fetch page";

/// Answer of a presence or window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Yes,
    No,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Yes => "YES",
            Status::No => "NO",
            Status::Error => "ERROR",
        }
    }
}

impl From<bool> for Status {
    fn from(found: bool) -> Self {
        if found {
            Status::Yes
        } else {
            Status::No
        }
    }
}

/// Keyword counters in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts(Vec<(String, u64)>);

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, count: u64) {
        self.0.push((key.into(), count));
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Counts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// What processing one rule produced. Exactly one variant per result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Error(String),
    Status(Status),
    Counts(Counts),
}

impl Outcome {
    pub fn error(msg: impl Into<String>) -> Self {
        Outcome::Error(msg.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}

/// The normalized record for one rule of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub timestamp: String,
    pub url: String,
    pub name: String,
    pub outcome: Outcome,
}

impl ExtractionResult {
    pub fn new(timestamp: impl Into<String>, rule: &SourceRule, outcome: Outcome) -> Self {
        Self {
            timestamp: timestamp.into(),
            url: rule.url.clone(),
            name: rule.name.clone(),
            outcome,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<Status> {
        match &self.outcome {
            Outcome::Status(s) => Some(*s),
            _ => None,
        }
    }

    pub fn counts(&self) -> Option<&Counts> {
        match &self.outcome {
            Outcome::Counts(c) => Some(c),
            _ => None,
        }
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload_len = match &self.outcome {
            Outcome::Counts(c) => c.len(),
            _ => 1,
        };
        let mut map = serializer.serialize_map(Some(3 + payload_len))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("url", &self.url)?;
        map.serialize_entry("name", &self.name)?;
        match &self.outcome {
            Outcome::Error(msg) => map.serialize_entry("error", msg)?,
            Outcome::Status(status) => map.serialize_entry("status", status)?,
            Outcome::Counts(counts) => {
                for (key, count) in counts.iter() {
                    map.serialize_entry(key, &count)?;
                }
            }
        }
        map.end()
    }
}

/// All results of one run, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub timestamp: String,
    pub results: Vec<ExtractionResult>,
}

impl Batch {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            results: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ExtractionResult> {
        self.results.iter().filter(|r| r.outcome.is_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rule() -> SourceRule {
        SourceRule::frequency("Jobs", "https://example.com/jobs", ["rust"])
    }

    #[test]
    fn counts_serialize_flat_in_order() {
        let mut counts = Counts::new();
        counts.push("title_rust", 2);
        counts.push("body_rust", 0);
        let result = ExtractionResult::new("2025-01-15 20:00:00", &rule(), Outcome::Counts(counts));

        let row = serde_json::to_string(&result).unwrap();
        assert_eq!(
            row,
            r#"{"timestamp":"2025-01-15 20:00:00","url":"https://example.com/jobs","name":"Jobs","title_rust":2,"body_rust":0}"#
        );
    }

    #[test]
    fn error_excludes_payload_fields() {
        let result = ExtractionResult::new("t", &rule(), Outcome::error(FETCH_FAILED));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"timestamp": "t", "url": "https://example.com/jobs", "name": "Jobs", "error": "Failed to fetch page"})
        );
        assert!(result.status().is_none());
        assert!(result.counts().is_none());
    }

    #[test]
    fn status_serializes_uppercase() {
        let result = ExtractionResult::new("t", &rule(), Outcome::Status(Status::Yes));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "YES");
        assert_eq!(Status::from(false).as_str(), "NO");
    }
}
