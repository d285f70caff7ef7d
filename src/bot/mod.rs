//! Command front end
//!
//! [`CommandBot`] long-polls the Bot API for messages and answers three
//! commands: `/start`, `/addsource` (channel administrators only) and
//! `/listsource`. Each update is handled under a deadline and inside a panic
//! boundary; whatever goes wrong, the sender gets `internal error` and polling
//! carries on.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::TelegramConfig;
use crate::error::Result;
use crate::storage::SourceRegistry;
use crate::telegram::{Message, SendMessage, TelegramClient, Update};

mod commands;

pub use commands::Command;

/// Reply sent when a handler fails, times out or panics
pub const INTERNAL_ERROR_REPLY: &str = "internal error";

/// Wait after a failed `getUpdates` call
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Long-polling command bot
pub struct CommandBot {
    client: Arc<TelegramClient>,
    registry: Arc<dyn SourceRegistry>,
    channel_id: i64,
    poll_timeout: Duration,
    command_timeout: Duration,
}

impl CommandBot {
    /// Create a bot answering through `client` and registering sources in `registry`
    pub fn new(
        client: Arc<TelegramClient>,
        registry: Arc<dyn SourceRegistry>,
        config: &TelegramConfig,
    ) -> Self {
        Self {
            client,
            registry,
            channel_id: config.channel_id,
            poll_timeout: config.poll_timeout,
            command_timeout: config.command_timeout,
        }
    }

    /// Poll for updates and handle them until `cancel` fires
    ///
    /// Polling errors are logged and retried after a short pause; they never
    /// end the loop.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        info!("command bot started");
        let mut offset: Option<i64> = None;

        loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                polled = self.client.get_updates(offset, self.poll_timeout) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "failed to poll updates");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(POLL_ERROR_BACKOFF) => continue,
                    }
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                self.handle_update(update).await;
            }
        }

        info!("command bot stopped");
        Ok(())
    }

    /// Handle a single update
    ///
    /// Non-command messages and unknown commands are ignored.
    pub async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(command) = message.text.as_deref().and_then(Command::parse) else {
            return;
        };

        debug!(
            update_id = update.update_id,
            chat_id = message.chat.id,
            command = command.name(),
            "command received"
        );

        let name = command.name();
        let handled = AssertUnwindSafe(tokio::time::timeout(
            self.command_timeout,
            self.dispatch(command, &message),
        ))
        .catch_unwind()
        .await;

        let failure = match handled {
            Ok(Ok(Ok(()))) => return,
            Ok(Ok(Err(e))) => format!("handler failed: {}", e),
            Ok(Err(_)) => format!("handler timed out after {:?}", self.command_timeout),
            Err(panic) => format!("handler panicked: {}", panic_message(panic.as_ref())),
        };

        error!(command = name, chat_id = message.chat.id, error = %failure, "command failed");
        self.reply_internal_error(&message).await;
    }

    async fn reply_internal_error(&self, message: &Message) {
        let reply = SendMessage::plain(message.chat.id, INTERNAL_ERROR_REPLY);
        if let Err(e) = self.client.send_message(&reply).await {
            error!(chat_id = message.chat.id, error = %e, "failed to send error reply");
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
