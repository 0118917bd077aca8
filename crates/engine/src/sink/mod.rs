// ABOUTME: Result sinks receive a finished batch: persistence and notification collaborators.
// ABOUTME: Provides the ResultSink trait plus JSON Lines and Telegram implementations.

pub mod jsonl;
pub mod telegram;

use crate::error::SinkError;
use crate::result::Batch;

pub use jsonl::JsonLinesSink;
pub use telegram::TelegramNotifier;

/// Something that accepts the full ordered batch.
pub trait ResultSink {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    fn accept(&self, batch: &Batch) -> Result<(), SinkError>;
}
