//! # news-relay
//!
//! Polls a set of RSS/Atom feeds, drops items matching a keyword block-list,
//! stores the rest in SQLite and relays them to a Telegram channel one at a
//! time, oldest first.
//!
//! ## Moving parts
//!
//! - [`fetcher::Fetcher`] polls every registered source on a fixed interval,
//!   all sources of one cycle in parallel.
//! - [`notifier::Notifier`] publishes at most one pending article per tick and
//!   marks it posted only after the channel accepted it.
//! - [`bot::CommandBot`] answers `/start`, `/addsource` and `/listsource`.
//!   Adding a source is limited to channel administrators.
//!
//! All three share one [`Database`] and stop together when their
//! cancellation token fires.
//!
//! ## Quick Start
//!
//! ```no_run
//! use news_relay::{App, Config, run_with_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::new("123456:bot-token", -1001234567890);
//!     config.filter_keywords = vec!["crypto".to_string()];
//!
//!     let app = App::new(config).await?;
//!     run_with_shutdown(app).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Component wiring and graceful shutdown
pub mod app;
/// Telegram command bot
pub mod bot;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Summary text extraction
pub mod extractor;
/// Feed retrieval and parsing
pub mod feed;
/// Periodic feed polling
pub mod fetcher;
/// Keyword block-list
pub mod filter;
/// Telegram MarkdownV2 helpers
pub mod markup;
/// Periodic article publishing
pub mod notifier;
/// Fixed-interval task runner
pub mod periodic;
/// Outbound message delivery
pub mod publisher;
/// Retry logic with exponential backoff
pub mod retry;
/// Storage seams used by the loops
pub mod storage;
/// Telegram Bot API client
pub mod telegram;
/// Core domain types
pub mod types;

// unwrap/expect are acceptable in test doubles
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use app::{App, run_with_shutdown};
pub use config::{Config, FailurePolicy, RetryConfig, TelegramConfig};
pub use db::Database;
pub use error::{DatabaseError, Error, Result, TelegramError};
pub use types::{
    Article, ArticleId, Item, NewArticle, NewSource, Source, SourceId, StoreOutcome,
};
