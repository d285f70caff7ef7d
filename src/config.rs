//! Configuration types for news-relay
//!
//! Every component receives the values it needs at construction time; nothing
//! reads configuration from global state. [`Config`] is the single value object
//! the binary loads from a JSON file and hands to [`crate::app::App`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`TelegramConfig::bot_token`]
pub const ENV_BOT_TOKEN: &str = "NEWS_RELAY_BOT_TOKEN";
/// Environment variable overriding [`TelegramConfig::channel_id`]
pub const ENV_CHANNEL_ID: &str = "NEWS_RELAY_CHANNEL_ID";
/// Environment variable overriding [`Config::database_path`]
pub const ENV_DATABASE_PATH: &str = "NEWS_RELAY_DATABASE_PATH";

/// Main configuration for news-relay
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path (default: "news-relay.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Telegram bot and channel settings
    pub telegram: TelegramConfig,

    /// How often every source is polled (default: 10 minutes)
    #[serde(default = "default_fetch_interval", with = "duration_serde")]
    pub fetch_interval: Duration,

    /// How often one article is published (default: 1 minute)
    #[serde(default = "default_notification_interval", with = "duration_serde")]
    pub notification_interval: Duration,

    /// Trailing window in which unposted articles stay eligible
    /// (default: twice the fetch interval)
    #[serde(default, with = "optional_duration_serde")]
    pub lookup_window: Option<Duration>,

    /// Case-insensitive keyword block-list
    #[serde(default)]
    pub filter_keywords: Vec<String>,

    /// What the notify loop does when one of its ticks fails
    ///
    /// The fetch loop always stops when the source list cannot be loaded.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Retry behavior for outbound deliveries
    #[serde(default)]
    pub retry: RetryConfig,

    /// Timeout for a single feed request (default: 30 seconds)
    #[serde(default = "default_http_timeout", with = "duration_serde")]
    pub http_timeout: Duration,

    /// User-Agent sent with feed requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Config {
    /// Create a configuration with defaults for everything but the Telegram credentials
    pub fn new(bot_token: impl Into<String>, channel_id: i64) -> Self {
        Self {
            database_path: default_database_path(),
            telegram: TelegramConfig::new(bot_token, channel_id),
            fetch_interval: default_fetch_interval(),
            notification_interval: default_notification_interval(),
            lookup_window: None,
            filter_keywords: Vec::new(),
            failure_policy: FailurePolicy::default(),
            retry: RetryConfig::default(),
            http_timeout: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from a JSON file, apply environment overrides and validate it
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(
                "path",
                format!("failed to read config file {}: {}", path.display(), e),
            )
        })?;
        let mut config: Config = serde_json::from_str(&raw)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `NEWS_RELAY_*` environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ENV_BOT_TOKEN)
            && !token.is_empty()
        {
            self.telegram.bot_token = token;
        }

        if let Ok(raw) = std::env::var(ENV_CHANNEL_ID) {
            match raw.parse::<i64>() {
                Ok(id) => self.telegram.channel_id = id,
                Err(e) => tracing::warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_CHANNEL_ID),
            }
        }

        if let Ok(path) = std::env::var(ENV_DATABASE_PATH)
            && !path.is_empty()
        {
            self.database_path = PathBuf::from(path);
        }
    }

    /// Check the configuration for values the loops cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(Error::config("telegram.bot_token", "bot token must not be empty"));
        }
        if self.fetch_interval.is_zero() {
            return Err(Error::config("fetch_interval", "must be greater than zero"));
        }
        if self.notification_interval.is_zero() {
            return Err(Error::config(
                "notification_interval",
                "must be greater than zero",
            ));
        }
        if let Some(window) = self.lookup_window {
            if window.is_zero() {
                return Err(Error::config("lookup_window", "must be greater than zero"));
            }
            if window < self.fetch_interval {
                tracing::warn!(
                    lookup_window = ?window,
                    fetch_interval = ?self.fetch_interval,
                    "Lookup window is shorter than the fetch interval; articles may expire before they are posted"
                );
            }
        }
        Ok(())
    }

    /// Effective lookup window: the configured one, or twice the fetch interval
    ///
    /// Saturates at [`Duration::MAX`] for absurdly long fetch intervals.
    pub fn effective_lookup_window(&self) -> Duration {
        self.lookup_window.unwrap_or_else(|| {
            self.fetch_interval
                .checked_mul(2)
                .unwrap_or(Duration::MAX)
        })
    }
}

/// Telegram bot and channel settings
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by @BotFather
    #[serde(default)]
    pub bot_token: String,

    /// Channel (chat) the articles are published to
    pub channel_id: i64,

    /// Bot API base URL (default: "https://api.telegram.org")
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Long-poll timeout for `getUpdates` (default: 60 seconds)
    #[serde(default = "default_poll_timeout", with = "duration_serde")]
    pub poll_timeout: Duration,

    /// Time budget for handling a single command (default: 5 seconds)
    #[serde(default = "default_command_timeout", with = "duration_serde")]
    pub command_timeout: Duration,
}

impl TelegramConfig {
    /// Settings with default API URL and timeouts
    pub fn new(bot_token: impl Into<String>, channel_id: i64) -> Self {
        Self {
            bot_token: bot_token.into(),
            channel_id,
            api_url: default_api_url(),
            poll_timeout: default_poll_timeout(),
            command_timeout: default_command_timeout(),
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

/// What a periodic loop does when one tick fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the loop and return the error (default)
    #[default]
    Abort,
    /// Log the error and wait for the next tick
    SkipAndContinue,
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }
}

// Default value functions
fn default_database_path() -> PathBuf {
    PathBuf::from("news-relay.db")
}

fn default_fetch_interval() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_notification_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("news-relay/{}", env!("CARGO_PKG_VERSION"))
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
