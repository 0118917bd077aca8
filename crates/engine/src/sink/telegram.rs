// ABOUTME: Sends batch summaries and run failures to a Telegram chat via the Bot API.
// ABOUTME: An unconfigured notifier logs and skips instead of failing.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::SinkError;
use crate::report::{failure_message, BatchSummary};
use crate::result::Batch;
use crate::sink::ResultSink;

pub const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SinkError::Http(e.to_string()))?;
        Ok(Self {
            token: token.filter(|t| !t.is_empty()),
            chat_id: chat_id.filter(|c| !c.is_empty()),
            api_base: TELEGRAM_API.to_string(),
            client,
        })
    }

    /// Point at a different Bot API host.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    /// Sends `text`. Returns Ok(false) when the notifier is not configured.
    pub fn send_message(&self, text: &str) -> Result<bool, SinkError> {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            info!("telegram not configured, message not sent");
            return Ok(false);
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), token);
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
        };
        self.client
            .post(url)
            .json(&payload)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| SinkError::Http(e.without_url().to_string()))?;

        info!("telegram notification sent");
        Ok(true)
    }

    /// Reports a run that failed before producing a batch. Delivery problems are logged only.
    pub fn send_failure(&self, error: &str, timestamp: &str) -> bool {
        match self.send_message(&failure_message(error, timestamp)) {
            Ok(sent) => sent,
            Err(err) => {
                warn!(error = %err, "failed to send telegram error notification");
                false
            }
        }
    }
}

impl ResultSink for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn accept(&self, batch: &Batch) -> Result<(), SinkError> {
        let summary = BatchSummary::from_batch(batch);
        self.send_message(&summary.message()).map(|_| ())
    }
}
