// ABOUTME: Error types for the pagewatch engine: fetch, extraction, configuration and sink failures.
// ABOUTME: FetchError carries a categorized code; the other errors are thiserror enums.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Categories of page fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorCode {
    InvalidUrl,
    Timeout,
    Status,
    Transport,
    Decode,
}

impl fmt::Display for FetchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchErrorCode::InvalidUrl => "invalid URL",
            FetchErrorCode::Timeout => "timeout",
            FetchErrorCode::Status => "non-success status",
            FetchErrorCode::Transport => "transport error",
            FetchErrorCode::Decode => "body decode error",
        };
        write!(f, "{}", s)
    }
}

/// A page could not be retrieved.
#[derive(Debug, Error)]
pub struct FetchError {
    pub code: FetchErrorCode,
    pub url: String,
    pub detail: Option<String>,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch {}: {}", self.url, self.code)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl FetchError {
    pub fn new(code: FetchErrorCode, url: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            code,
            url: url.into(),
            detail,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(FetchErrorCode::InvalidUrl, url, Some(detail.into()))
    }

    /// Create a Status error for a non-2xx response.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::new(FetchErrorCode::Status, url, Some(format!("HTTP {}", status)))
    }

    /// Maps a reqwest error onto the matching code.
    pub fn from_reqwest(url: impl Into<String>, err: &reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            FetchErrorCode::Timeout
        } else if err.is_decode() || err.is_body() {
            FetchErrorCode::Decode
        } else if let Some(status) = err.status() {
            return Self::status(url, status.as_u16());
        } else {
            FetchErrorCode::Transport
        };
        Self::new(code, url, Some(err.to_string()))
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == FetchErrorCode::Timeout
    }

    /// Returns true if the server answered with a non-success status.
    pub fn is_status(&self) -> bool {
        self.code == FetchErrorCode::Status
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == FetchErrorCode::InvalidUrl
    }
}

/// Failures raised while extracting a signal from one document.
///
/// Configuration variants mean the rule itself is unusable. `StructuralMismatch`
/// means the page no longer has the layout the rule expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no keywords configured")]
    NoKeywordsConfigured,

    #[error("unknown extraction type: {0}")]
    UnknownExtractionType(String),

    #[error("missing selector: {0}")]
    MissingSelector(&'static str),

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("conflicting counter key: {0}")]
    ConflictingCounterKey(String),

    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
}

impl ExtractError {
    pub fn structural(msg: impl Into<String>) -> Self {
        ExtractError::StructuralMismatch(msg.into())
    }

    /// Returns true when the rule configuration, not the page, is at fault.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ExtractError::StructuralMismatch(_))
    }
}

/// The rules file could not be loaded. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A result sink failed to accept a batch.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("notification delivery failed: {0}")]
    Http(String),
}
