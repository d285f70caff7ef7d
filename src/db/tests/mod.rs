
use crate::db::Database;
use crate::types::{NewArticle, NewSource, SourceId};
use chrono::{DateTime, TimeZone, Utc};
use tempfile::NamedTempFile;

/// Helper: create a fresh database with migrations applied
async fn setup_db() -> (Database, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    (db, temp_file)
}

/// Helper: register a source, returning its ID
async fn insert_test_source(db: &Database, name: &str, url: &str) -> SourceId {
    db.add_source(&NewSource {
        name: name.to_string(),
        feed_url: url.to_string(),
    })
    .await
    .unwrap()
}

/// Helper: build an article for `source_id` published at `published` (unix seconds)
fn article(source_id: SourceId, link: &str, published: i64) -> NewArticle {
    NewArticle {
        source_id,
        title: format!("Title for {link}"),
        link: link.to_string(),
        summary: "<p>summary</p>".to_string(),
        published_at: ts(published),
    }
}

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}
