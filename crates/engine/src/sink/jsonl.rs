// ABOUTME: Appends each batch to a JSON Lines results file, one flat row per rule.
// ABOUTME: Creates the parent directory on first write; existing rows are never rewritten.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::info;

use crate::error::SinkError;
use crate::result::Batch;
use crate::sink::ResultSink;

/// Default results file, relative to the working directory.
pub const DEFAULT_RESULTS_PATH: &str = "data/results.jsonl";

#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultSink for JsonLinesSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn accept(&self, batch: &Batch) -> Result<(), SinkError> {
        if batch.is_empty() {
            info!("no results to append");
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for result in &batch.results {
            serde_json::to_writer(&mut writer, result)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        info!(path = %self.path.display(), rows = batch.len(), "results appended");
        Ok(())
    }
}
