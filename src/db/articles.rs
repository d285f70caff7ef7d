//! Article store operations.
//!
//! `(source_id, link)` is unique, so re-storing an already seen item is absorbed
//! by the insert itself and never creates a second row.

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::types::{Article, ArticleId, NewArticle, StoreOutcome};
use crate::{Error, Result};

use super::{ArticleRow, Database};

impl Database {
    /// Store an article, ignoring it if its (source, link) pair is already known
    pub async fn store_article(&self, article: &NewArticle) -> Result<StoreOutcome> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO articles (source_id, title, link, summary, published_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(source_id, link) DO NOTHING
            "#,
        )
        .bind(article.source_id)
        .bind(&article.title)
        .bind(&article.link)
        .bind(&article.summary)
        .bind(article.published_at.timestamp())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to store article: {}",
                e
            )))
        })?;

        if result.rows_affected() == 0 {
            return Ok(StoreOutcome::Duplicate);
        }

        Ok(StoreOutcome::Inserted(ArticleId(result.last_insert_rowid())))
    }

    /// List un-posted articles published at or after `since`, oldest first
    pub async fn list_not_posted(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, source_id, title, link, summary, published_at, posted_at, created_at
            FROM articles
            WHERE posted_at IS NULL AND published_at >= ?
            ORDER BY published_at ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(since.timestamp())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list un-posted articles: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// Mark an article as posted
    ///
    /// The timestamp is only written once; marking an already posted article is a no-op.
    /// An unknown ID is reported as [`DatabaseError::NotFound`].
    pub async fn mark_posted(&self, id: ArticleId) -> Result<()> {
        let now = Utc::now().timestamp();

        let result = sqlx::query("UPDATE articles SET posted_at = ? WHERE id = ? AND posted_at IS NULL")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to mark article posted: {}",
                    e
                )))
            })?;

        if result.rows_affected() == 0 && self.get_article(id).await?.is_none() {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "article {}",
                id
            ))));
        }

        Ok(())
    }

    /// Get an article by ID
    pub async fn get_article(&self, id: ArticleId) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, source_id, title, link, summary, published_at, posted_at, created_at
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get article: {}",
                e
            )))
        })?;

        Ok(row.map(Article::from))
    }

    /// Count stored articles across all sources
    pub async fn count_articles(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count articles: {}",
                    e
                )))
            })?;

        Ok(count)
    }
}
