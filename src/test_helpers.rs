//! Shared test doubles for the fetch and notify loops.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::feed::FeedFetcher;
use crate::publisher::Publisher;
use crate::storage::SourceProvider;
use crate::types::{Item, NewSource, Source, SourceId};

/// Fresh database in a temp dir. The dir must outlive the database.
pub(crate) async fn create_test_db() -> (Arc<Database>, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
    (Arc::new(db), temp_dir)
}

/// Register a source pointing at `url`
pub(crate) async fn add_source(db: &Database, name: &str, url: &str) -> SourceId {
    db.add_source(&NewSource {
        name: name.to_string(),
        feed_url: url.to_string(),
    })
    .await
    .unwrap()
}

pub(crate) fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Feed item published at `published` (unix seconds)
pub(crate) fn item(title: &str, link: &str, published: i64, categories: &[&str]) -> Item {
    Item {
        title: title.to_string(),
        link: link.to_string(),
        summary: format!("<p>About {title}</p>"),
        published_at: ts(published).fixed_offset(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
    }
}

enum FeedResponse {
    Items(Vec<Item>),
    Fail(String),
}

/// [`FeedFetcher`] answering from a table keyed by feed URL
#[derive(Default)]
pub(crate) struct StaticFeeds {
    responses: std::sync::Mutex<HashMap<String, FeedResponse>>,
    delays: std::sync::Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
    finished: AtomicUsize,
}

impl StaticFeeds {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_items(self, url: &str, items: Vec<Item>) -> Self {
        self.set_items(url, items);
        self
    }

    pub(crate) fn with_failure(self, url: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), FeedResponse::Fail(message.to_string()));
        self
    }

    pub(crate) fn with_delay(self, url: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
        self
    }

    pub(crate) fn set_items(&self, url: &str, items: Vec<Item>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), FeedResponse::Items(items));
    }

    /// Fetches started
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fetches that ran to completion
    pub(crate) fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedFetcher for StaticFeeds {
    async fn fetch(&self, source: &Source) -> Result<Vec<Item>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(&source.feed_url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = match self.responses.lock().unwrap().get(&source.feed_url) {
            Some(FeedResponse::Items(items)) => Ok(items.clone()),
            Some(FeedResponse::Fail(msg)) => Err(Error::Feed(msg.clone())),
            None => Ok(Vec::new()),
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// [`SourceProvider`] whose registry is unreachable
pub(crate) struct BrokenRegistry;

#[async_trait]
impl SourceProvider for BrokenRegistry {
    async fn list_sources(&self) -> Result<Vec<Source>> {
        Err(Error::Other("registry unavailable".into()))
    }
}

/// [`Publisher`] that records every message, optionally failing first
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    sent: Mutex<Vec<String>>,
    failures_left: AtomicUsize,
}

impl RecordingPublisher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` sends
    pub(crate) fn failing(n: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures_left: AtomicUsize::new(n),
        }
    }

    pub(crate) async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn send(&self, message: &str) -> Result<()> {
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(Error::Other("channel unavailable".into()));
        }

        self.sent.lock().await.push(message.to_string());
        Ok(())
    }
}
