//! Periodic select-extract-publish-mark cycle
//!
//! Every tick picks the earliest-published un-posted article inside the lookup
//! window, publishes it, and marks it posted. Exactly one article goes out per
//! tick no matter how large the backlog is.
//!
//! Publishing happens before the posted flag is written, so a crash between
//! the two steps delivers the article again after restart.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{Config, FailurePolicy};
use crate::error::Result;
use crate::extractor;
use crate::markup::{bold, escape_markdown_v2};
use crate::periodic::run_periodic;
use crate::publisher::Publisher;
use crate::storage::ArticleProvider;
use crate::types::{Article, ArticleId};

/// Longest cleaned summary (in characters) put into a message
///
/// Telegram caps messages at 4096 characters after entity parsing.
const MAX_SUMMARY_CHARS: usize = 3000;

/// Owns the notification schedule
pub struct Notifier {
    articles: Arc<dyn ArticleProvider>,
    publisher: Arc<dyn Publisher>,
    interval: Duration,
    lookup_window: Duration,
    policy: FailurePolicy,
}

impl Notifier {
    /// Create a notifier from its collaborators and the notification settings in `config`
    pub fn new(
        articles: Arc<dyn ArticleProvider>,
        publisher: Arc<dyn Publisher>,
        config: &Config,
    ) -> Self {
        Self {
            articles,
            publisher,
            interval: config.notification_interval,
            lookup_window: config.effective_lookup_window(),
            policy: config.failure_policy,
        }
    }

    /// Run a pass now and then every notification interval until `cancel` fires
    pub async fn start(&self, cancel: &CancellationToken) -> Result<()> {
        run_periodic("notifier", self.interval, cancel, self.policy, || async move {
            self.select_and_send(cancel).await.map(|_| ())
        })
        .await
    }

    /// Publish the oldest pending article, if there is one
    ///
    /// Returns the ID of the article that was published and marked, or `None`
    /// when nothing was pending (or shutdown began before publishing).
    pub async fn select_and_send(&self, cancel: &CancellationToken) -> Result<Option<ArticleId>> {
        let since = self.window_start(Utc::now());

        let Some(article) = self.articles.list_not_posted(since, 1).await?.into_iter().next()
        else {
            debug!(since = %since, "no pending articles");
            return Ok(None);
        };

        let message = format_message(&article);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(article_id = %article.id, "shutdown before publishing, article stays pending");
                return Ok(None);
            }
            sent = self.publisher.send(&message) => sent?,
        }

        self.articles.mark_posted(article.id).await?;

        info!(
            article_id = %article.id,
            source_id = %article.source_id,
            link = %article.link,
            "article published"
        );

        Ok(Some(article.id))
    }

    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.lookup_window)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Render an article as a MarkdownV2 message: bold title, cleaned summary, link
///
/// The summary section is left out when the cleaned summary is empty.
pub fn format_message(article: &Article) -> String {
    let summary = truncate_chars(&extractor::clean(&article.summary), MAX_SUMMARY_CHARS);
    let title = bold(article.title.trim());
    let link = escape_markdown_v2(&article.link);

    if summary.is_empty() {
        format!("{}\n\n{}", title, link)
    } else {
        format!("{}\n\n{}\n\n{}", title, escape_markdown_v2(&summary), link)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
