//! Source registry operations.

use crate::error::DatabaseError;
use crate::types::{NewSource, Source, SourceId};
use crate::{Error, Result};

use super::{Database, SourceRow};

impl Database {
    /// Get all registered sources, in registration order
    pub async fn list_sources(&self) -> Result<Vec<Source>> {
        let rows = sqlx::query_as::<_, SourceRow>(
            r#"
            SELECT id, name, feed_url, created_at
            FROM sources
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list sources: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(Source::from).collect())
    }

    /// Get a source by ID
    pub async fn get_source(&self, id: SourceId) -> Result<Option<Source>> {
        let row = sqlx::query_as::<_, SourceRow>(
            r#"
            SELECT id, name, feed_url, created_at
            FROM sources
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get source: {}",
                e
            )))
        })?;

        Ok(row.map(Source::from))
    }

    /// Register a new source
    ///
    /// Fails with [`DatabaseError::QueryFailed`] when the feed URL is already registered.
    pub async fn add_source(&self, source: &NewSource) -> Result<SourceId> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO sources (name, feed_url, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&source.name)
        .bind(&source.feed_url)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert source: {}",
                e
            )))
        })?;

        Ok(SourceId(result.last_insert_rowid()))
    }
}
