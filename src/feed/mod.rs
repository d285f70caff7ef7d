//! Feed retrieval and parsing
//!
//! [`HttpFeedFetcher`] downloads a source's feed and turns it into [`Item`]s.
//! RSS 2.0 is tried first, Atom second; a document that is neither fails with
//! both parser errors in the message.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Item, Source};

mod parse;

pub use parse::{parse_atom, parse_feed, parse_rss};

/// Retrieves the current items of a source
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch and parse the feed behind `source`
    async fn fetch(&self, source: &Source) -> Result<Vec<Item>>;
}

/// [`FeedFetcher`] backed by an HTTP client
#[derive(Clone)]
pub struct HttpFeedFetcher {
    http_client: reqwest::Client,
}

impl HttpFeedFetcher {
    /// Create a fetcher with the given request timeout and user agent
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<Item>> {
        debug!(source_id = %source.id, url = %source.feed_url, "fetching feed");

        let response = self.http_client.get(&source.feed_url).send().await?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Feed(format!(
                "feed returned HTTP {}: {}",
                status.as_u16(),
                source.feed_url
            )));
        }

        let content = response.bytes().await?;
        parse_feed(&content)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
