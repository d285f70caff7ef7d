//! Outbound delivery of formatted messages

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::RetryConfig;
use crate::error::Result;
use crate::retry::with_retry;
use crate::telegram::{SendMessage, TelegramClient};

/// Delivers a formatted message to the output channel
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Deliver `message`, already escaped for the channel's markup
    async fn send(&self, message: &str) -> Result<()>;
}

/// [`Publisher`] that posts MarkdownV2 messages to a Telegram channel
///
/// Rate limits, server errors and connection failures are retried according to
/// the configured [`RetryConfig`] before the error is returned.
pub struct ChannelPublisher {
    client: Arc<TelegramClient>,
    channel_id: i64,
    retry: RetryConfig,
}

impl ChannelPublisher {
    /// Publish to `channel_id` through `client`
    pub fn new(client: Arc<TelegramClient>, channel_id: i64, retry: RetryConfig) -> Self {
        Self {
            client,
            channel_id,
            retry,
        }
    }
}

#[async_trait]
impl Publisher for ChannelPublisher {
    async fn send(&self, message: &str) -> Result<()> {
        let request = SendMessage::markdown_v2(self.channel_id, message);
        let sent = with_retry(&self.retry, || self.client.send_message(&request)).await?;

        debug!(
            channel_id = self.channel_id,
            message_id = sent.message_id,
            "message published"
        );
        Ok(())
    }
}
