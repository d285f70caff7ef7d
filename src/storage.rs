//! Narrow persistence interfaces consumed by the fetch and notify loops
//!
//! The loops never see [`Database`] directly. They depend on these traits so a
//! different store (or an in-memory double in tests) can be plugged in.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::db::Database;
use crate::types::{Article, ArticleId, NewArticle, NewSource, Source, SourceId, StoreOutcome};

/// Read side of the source registry
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Return every configured source
    async fn list_sources(&self) -> Result<Vec<Source>>;
}

/// Write side of the source registry, used by the command front end
#[async_trait]
pub trait SourceRegistry: SourceProvider {
    /// Register a new source and return its ID
    async fn add_source(&self, source: &NewSource) -> Result<SourceId>;
}

/// Insert side of the article store
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Store an article
    ///
    /// Must be idempotent per (source, link): storing a known pair again
    /// returns [`StoreOutcome::Duplicate`], not an error.
    async fn store(&self, article: &NewArticle) -> Result<StoreOutcome>;
}

/// Selection and status side of the article store
#[async_trait]
pub trait ArticleProvider: Send + Sync {
    /// Un-posted articles published at or after `since`, earliest first, at most `limit`
    async fn list_not_posted(&self, since: DateTime<Utc>, limit: u32) -> Result<Vec<Article>>;

    /// Flag an article as delivered
    async fn mark_posted(&self, id: ArticleId) -> Result<()>;
}

#[async_trait]
impl SourceProvider for Database {
    async fn list_sources(&self) -> Result<Vec<Source>> {
        Database::list_sources(self).await
    }
}

#[async_trait]
impl SourceRegistry for Database {
    async fn add_source(&self, source: &NewSource) -> Result<SourceId> {
        Database::add_source(self, source).await
    }
}

#[async_trait]
impl ArticleStore for Database {
    async fn store(&self, article: &NewArticle) -> Result<StoreOutcome> {
        self.store_article(article).await
    }
}

#[async_trait]
impl ArticleProvider for Database {
    async fn list_not_posted(&self, since: DateTime<Utc>, limit: u32) -> Result<Vec<Article>> {
        Database::list_not_posted(self, since, limit).await
    }

    async fn mark_posted(&self, id: ArticleId) -> Result<()> {
        Database::mark_posted(self, id).await
    }
}
