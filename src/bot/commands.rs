//! Command parsing and handlers

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::markup::{bold, escape_markdown_v2};
use crate::telegram::{Message, SendMessage};
use crate::types::{NewSource, Source};

use super::CommandBot;

/// Commands the bot understands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/addsource {"name": ..., "url": ...}`
    AddSource(String),
    /// `/listsource`
    ListSources,
}

impl Command {
    /// Parse a message text into a command
    ///
    /// Accepts the `/cmd@botname` form. Returns `None` for non-commands and
    /// unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "addsource" => Some(Command::AddSource(args.to_string())),
            "listsource" => Some(Command::ListSources),
            _ => None,
        }
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::AddSource(_) => "addsource",
            Command::ListSources => "listsource",
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddSourceArgs {
    name: String,
    url: String,
}

const START_TEXT: &str = "Hi! I relay fresh posts from RSS and Atom feeds to the channel.\n\n\
Commands:\n\
/addsource {\"name\": \"...\", \"url\": \"...\"} registers a feed (channel administrators only)\n\
/listsource shows the registered feeds";

const ADD_SOURCE_USAGE: &str =
    "Usage: /addsource {\"name\": \"Example\", \"url\": \"https://example.com/feed.xml\"}";

const ADMIN_ONLY_TEXT: &str = "This command is available to channel administrators only.";

impl CommandBot {
    pub(super) async fn dispatch(&self, command: Command, message: &Message) -> Result<()> {
        match command {
            Command::Start => self.reply_plain(message, START_TEXT).await,
            Command::AddSource(args) => {
                if !self.is_channel_admin(message).await? {
                    warn!(chat_id = message.chat.id, "non-admin tried to add a source");
                    return self.reply_plain(message, ADMIN_ONLY_TEXT).await;
                }
                self.add_source(message, &args).await
            }
            Command::ListSources => self.list_sources(message).await,
        }
    }

    async fn add_source(&self, message: &Message, args: &str) -> Result<()> {
        let Some(source) = parse_add_source_args(args) else {
            return self.reply_plain(message, ADD_SOURCE_USAGE).await;
        };

        let id = self.registry.add_source(&source).await?;
        info!(source_id = %id, name = %source.name, url = %source.feed_url, "source added");

        self.reply_plain(message, &format!("Source added: {}", id))
            .await
    }

    async fn list_sources(&self, message: &Message) -> Result<()> {
        let sources = self.registry.list_sources().await?;
        self.reply_markdown(message, &format_source_list(&sources))
            .await
    }

    async fn is_channel_admin(&self, message: &Message) -> Result<bool> {
        let Some(user) = &message.from else {
            return Ok(false);
        };

        let admins = self.client.get_chat_administrators(self.channel_id).await?;
        Ok(admins.iter().any(|member| member.user.id == user.id))
    }

    async fn reply_plain(&self, message: &Message, text: &str) -> Result<()> {
        let reply = SendMessage::plain(message.chat.id, text).reply_to(message.message_id);
        self.client.send_message(&reply).await.map(|_| ())
    }

    async fn reply_markdown(&self, message: &Message, text: &str) -> Result<()> {
        let reply = SendMessage::markdown_v2(message.chat.id, text).reply_to(message.message_id);
        self.client.send_message(&reply).await.map(|_| ())
    }
}

/// Parse and validate `/addsource` arguments
fn parse_add_source_args(args: &str) -> Option<NewSource> {
    let parsed: AddSourceArgs = serde_json::from_str(args).ok()?;
    let name = parsed.name.trim();
    let url = url::Url::parse(parsed.url.trim()).ok()?;

    if name.is_empty() || !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    Some(NewSource {
        name: name.to_string(),
        feed_url: url.to_string(),
    })
}

/// MarkdownV2 listing of every source with a count header
pub(crate) fn format_source_list(sources: &[Source]) -> String {
    let entries: Vec<String> = sources
        .iter()
        .map(|s| {
            format!(
                "{}\nID: {}\nURL: {}",
                bold(&s.name),
                s.id,
                escape_markdown_v2(&s.feed_url)
            )
        })
        .collect();

    let header = escape_markdown_v2(&format!("Sources (total {}):", sources.len()));
    if entries.is_empty() {
        header
    } else {
        format!("{}\n\n{}", header, entries.join("\n\n"))
    }
}
