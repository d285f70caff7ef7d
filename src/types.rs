//! Core types for news-relay

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw database id
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the inner i64 value
            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl PartialEq<i64> for $name {
            fn eq(&self, other: &i64) -> bool {
                self.0 == *other
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl sqlx::Type<sqlx::Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
            }

            fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
                <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
                sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for $name {
            fn decode(
                value: sqlx::sqlite::SqliteValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
                Ok(Self(id))
            }
        }
    };
}

id_type!(
    /// Unique identifier for a registered feed source
    SourceId
);

id_type!(
    /// Unique identifier for a stored article
    ArticleId
);

/// A configured feed to poll
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Database ID
    pub id: SourceId,
    /// Display name chosen at registration
    pub name: String,
    /// RSS or Atom feed URL
    pub feed_url: String,
    /// When the source was registered
    pub created_at: DateTime<Utc>,
}

/// A source about to be registered
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSource {
    /// Display name
    pub name: String,
    /// RSS or Atom feed URL
    pub feed_url: String,
}

/// One entry parsed from a feed during a single fetch.
///
/// Items are never persisted as-is: the fetcher filters them and turns the
/// survivors into [`NewArticle`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    /// Entry title
    pub title: String,
    /// Entry link, the dedup key together with the source
    pub link: String,
    /// Raw summary (usually an HTML fragment)
    pub summary: String,
    /// Publication time in whatever offset the feed used
    pub published_at: DateTime<FixedOffset>,
    /// Category labels attached by the feed
    pub categories: Vec<String>,
}

/// An article about to be stored
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewArticle {
    /// Source the item came from
    pub source_id: SourceId,
    /// Entry title
    pub title: String,
    /// Entry link
    pub link: String,
    /// Raw summary
    pub summary: String,
    /// Publication time, normalized to UTC
    pub published_at: DateTime<Utc>,
}

/// The persisted, deduplicated record of an item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Database ID
    pub id: ArticleId,
    /// Source the item came from
    pub source_id: SourceId,
    /// Entry title
    pub title: String,
    /// Entry link
    pub link: String,
    /// Raw summary as fetched
    pub summary: String,
    /// Publication time (UTC)
    pub published_at: DateTime<Utc>,
    /// When the article was delivered to the channel, if it was
    pub posted_at: Option<DateTime<Utc>>,
    /// When the article was first stored
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Whether the article was already delivered
    pub fn is_posted(&self) -> bool {
        self.posted_at.is_some()
    }
}

/// Result of storing an article
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOutcome {
    /// A new row was created
    Inserted(ArticleId),
    /// The (source, link) pair was already known; nothing changed
    Duplicate,
}

impl StoreOutcome {
    /// Whether a new row was created
    pub fn is_inserted(&self) -> bool {
        matches!(self, StoreOutcome::Inserted(_))
    }
}
