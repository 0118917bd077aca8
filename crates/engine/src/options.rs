// ABOUTME: Runtime options for a pagewatch run: request timeout, User-Agent and inter-request delay.
// ABOUTME: RunnerBuilder provides a fluent API for constructing BatchRunner instances.

use std::time::Duration;

use crate::error::FetchError;
use crate::resource::HttpFetcher;
use crate::runner::{BatchRunner, FixedDelay};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (compatible; pagewatch/0.1)";

/// Configuration for one process. Built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub delay: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay: DEFAULT_DELAY,
        }
    }
}

/// Builder for constructing a BatchRunner backed by HTTP.
#[derive(Debug, Clone, Default)]
pub struct RunnerBuilder {
    opts: RunnerOptions,
}

impl RunnerBuilder {
    /// Create a new RunnerBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the pause applied after each successful fetch.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.opts.delay = delay;
        self
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.opts
    }

    /// Build the runner with the configured options.
    pub fn build(self) -> Result<BatchRunner<HttpFetcher, FixedDelay>, FetchError> {
        let fetcher = HttpFetcher::new(&self.opts)?;
        Ok(BatchRunner::new(fetcher, FixedDelay(self.opts.delay)))
    }
}
