// ABOUTME: Page fetching: the Fetcher seam used by the batch runner and its blocking HTTP implementation.
// ABOUTME: Applies the configured timeout and User-Agent and treats non-2xx responses as failures.

use reqwest::blocking::Client;
use tracing::debug;

use crate::dom::ParsedDocument;
use crate::error::FetchError;
use crate::options::RunnerOptions;

/// Retrieves and parses a page.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<ParsedDocument, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<ParsedDocument, FetchError> {
        (**self).fetch(url)
    }
}

/// Fetches pages over HTTP(S) with a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(opts: &RunnerOptions) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&opts.user_agent)
            .timeout(opts.timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::from_reqwest("", &e))?;
        Ok(Self { client })
    }

    /// Downloads the body of `url` as text.
    pub fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        if let Err(e) = url::Url::parse(url) {
            return Err(FetchError::invalid_url(url, e.to_string()));
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| FetchError::from_reqwest(url, &e))?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "fetched page");
        Ok(body)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<ParsedDocument, FetchError> {
        let body = self.fetch_text(url)?;
        Ok(ParsedDocument::parse(&body))
    }
}
