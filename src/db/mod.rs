//! Database layer for news-relay
//!
//! Handles SQLite persistence for feed sources and discovered articles.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - `migrations`: database lifecycle, schema migrations
//! - `sources`: source registry (add/list)
//! - `articles`: article store (dedup-aware insert, unposted selection, posted flag)

use crate::types::{Article, ArticleId, Source, SourceId};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{FromRow, sqlite::SqlitePool};

mod articles;
mod migrations;
mod sources;

/// Source record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct SourceRow {
    /// Unique database ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Feed URL
    pub feed_url: String,
    /// Unix timestamp when the source was registered
    pub created_at: i64,
}

impl From<SourceRow> for Source {
    fn from(row: SourceRow) -> Self {
        Source {
            id: SourceId(row.id),
            name: row.name,
            feed_url: row.feed_url,
            created_at: from_unix(row.created_at),
        }
    }
}

/// Article record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    /// Unique database ID
    pub id: i64,
    /// Source this article was fetched from
    pub source_id: i64,
    /// Entry title
    pub title: String,
    /// Entry link
    pub link: String,
    /// Raw summary
    pub summary: String,
    /// Unix timestamp (UTC) of publication
    pub published_at: i64,
    /// Unix timestamp when the article was posted, NULL while pending
    pub posted_at: Option<i64>,
    /// Unix timestamp when the article was stored
    pub created_at: i64,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: ArticleId(row.id),
            source_id: SourceId(row.source_id),
            title: row.title,
            link: row.link,
            summary: row.summary,
            published_at: from_unix(row.published_at),
            posted_at: row.posted_at.map(from_unix),
            created_at: from_unix(row.created_at),
        }
    }
}

fn from_unix(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Database handle for news-relay
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
