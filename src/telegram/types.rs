//! Bot API payloads (the subset this crate reads and writes)

use serde::{Deserialize, Serialize};

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseParameters {
    pub retry_after: Option<u64>,
}

/// Incoming update from `getUpdates`
#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    /// Monotonic update identifier, used as the polling offset
    pub update_id: i64,
    /// New incoming message, if this update carries one
    pub message: Option<Message>,
}

/// A chat message
#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    /// Identifier unique within the chat
    pub message_id: i64,
    /// Sender, absent for channel posts
    pub from: Option<User>,
    /// Chat the message belongs to
    pub chat: Chat,
    /// Text for text messages
    pub text: Option<String>,
}

/// A Telegram user or bot
#[derive(Clone, Debug, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Whether this user is a bot
    #[serde(default)]
    pub is_bot: bool,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Username without the leading `@`
    pub username: Option<String>,
}

/// A chat
#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    /// Unique identifier
    pub id: i64,
    /// `private`, `group`, `supergroup` or `channel`
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Entry of `getChatAdministrators`
#[derive(Clone, Debug, Deserialize)]
pub struct ChatMember {
    /// `creator` or `administrator` for this method
    pub status: String,
    /// The member
    pub user: User,
}

/// `sendMessage` parameters
#[derive(Clone, Debug, Serialize)]
pub struct SendMessage<'a> {
    /// Target chat or channel
    pub chat_id: i64,
    /// Message text
    pub text: &'a str,
    /// `MarkdownV2`, `HTML` or absent for plain text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    /// Message to reply to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl<'a> SendMessage<'a> {
    /// Plain text message
    pub fn plain(chat_id: i64, text: &'a str) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: None,
            reply_to_message_id: None,
        }
    }

    /// MarkdownV2 message; `text` must already be escaped
    pub fn markdown_v2(chat_id: i64, text: &'a str) -> Self {
        Self {
            parse_mode: Some("MarkdownV2"),
            ..Self::plain(chat_id, text)
        }
    }

    /// Send as a reply to `message_id`
    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub(crate) struct GetChatAdministrators {
    pub chat_id: i64,
}
