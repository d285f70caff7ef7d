//! Error types for news-relay
//!
//! This module provides the error taxonomy shared by every component:
//! - [`Error`] is the crate-wide error returned by the fetch and notify loops
//! - [`DatabaseError`] narrows persistence failures (connection, migration, query)
//! - [`TelegramError`] carries failures reported by the Telegram Bot API itself

use thiserror::Error;

/// Result type alias for news-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for news-relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch_interval")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Network error (feed retrieval, Bot API transport)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Feed could not be retrieved or parsed
    #[error("feed error: {0}")]
    Feed(String),

    /// The Telegram Bot API rejected a request
    #[error("telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Errors reported by the Telegram Bot API
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The API answered with `ok: false`
    #[error("Bot API error {code}: {description}")]
    Api {
        /// HTTP-like error code from the response body (e.g. 400, 403, 429)
        code: i64,
        /// Description supplied by the API
        description: String,
        /// Seconds to wait before retrying, present on 429 responses
        retry_after: Option<u64>,
    },

    /// The API answered `ok: true` without a result payload
    #[error("Bot API response for {method} carried no result")]
    MissingResult {
        /// The Bot API method that was called
        method: String,
    },
}

impl TelegramError {
    /// Whether the API asked us to slow down or failed on its side
    pub fn is_transient(&self) -> bool {
        match self {
            TelegramError::Api { code, .. } => *code == 429 || *code >= 500,
            TelegramError::MissingResult { .. } => false,
        }
    }
}
