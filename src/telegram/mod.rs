//! Minimal Telegram Bot API client
//!
//! Only the three methods the relay needs: `sendMessage` for publishing and
//! replies, `getUpdates` for the command bot's long polling, and
//! `getChatAdministrators` for its admin guard. Every call is a JSON POST to
//! `{api_url}/bot{token}/{method}`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::error::{Error, Result, TelegramError};

mod types;

pub use types::{Chat, ChatMember, Message, SendMessage, Update, User};
use types::{ApiResponse, GetChatAdministrators, GetUpdates};

/// Default deadline for short calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bot API client bound to one bot token
#[derive(Clone)]
pub struct TelegramClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // base_url embeds the token
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a client for the bot described by `config`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("news-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
        })
    }

    /// Send a message
    pub async fn send_message(&self, message: &SendMessage<'_>) -> Result<Message> {
        self.call("sendMessage", message, REQUEST_TIMEOUT).await
    }

    /// Long-poll for updates after `offset`
    ///
    /// The server holds the request for up to `timeout` when nothing is pending.
    pub async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        let params = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &params, timeout + REQUEST_TIMEOUT)
            .await
    }

    /// List the administrators of a chat
    pub async fn get_chat_administrators(&self, chat_id: i64) -> Result<Vec<ChatMember>> {
        self.call(
            "getChatAdministrators",
            &GetChatAdministrators { chat_id },
            REQUEST_TIMEOUT,
        )
        .await
    }

    async fn call<P, R>(&self, method: &str, params: &P, timeout: Duration) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(method, "calling Bot API");

        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, method))
            .json(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::Network(e.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(e.without_url()))?;

        let envelope: ApiResponse<R> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            // Proxies and outages answer with non-JSON bodies
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    code: i64::from(status.as_u16()),
                    description: String::from_utf8_lossy(&body).trim().to_string(),
                    retry_after: None,
                }
                .into());
            }
            Err(e) => return Err(Error::Serialization(e)),
        };

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
                retry_after: envelope.parameters.and_then(|p| p.retry_after),
            }
            .into());
        }

        envelope.result.ok_or_else(|| {
            TelegramError::MissingResult {
                method: method.to_string(),
            }
            .into()
        })
    }
}
