//! Process wiring
//!
//! [`App`] builds every component from a [`Config`] and runs the fetch loop,
//! the notify loop and the command bot side by side under one cancellation
//! token.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::bot::CommandBot;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::feed::HttpFeedFetcher;
use crate::fetcher::Fetcher;
use crate::notifier::Notifier;
use crate::publisher::ChannelPublisher;
use crate::telegram::TelegramClient;

/// The assembled relay
pub struct App {
    db: Arc<Database>,
    fetcher: Fetcher,
    notifier: Notifier,
    bot: CommandBot,
}

impl App {
    /// Validate `config`, open the database and build every component
    ///
    /// No network calls are made until [`App::run`].
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(Database::new(&config.database_path).await?);
        let feeds = Arc::new(HttpFeedFetcher::new(config.http_timeout, &config.user_agent)?);
        let client = Arc::new(TelegramClient::new(&config.telegram)?);
        let publisher = Arc::new(ChannelPublisher::new(
            client.clone(),
            config.telegram.channel_id,
            config.retry.clone(),
        ));

        let fetcher = Fetcher::new(db.clone(), db.clone(), feeds, &config);
        let notifier = Notifier::new(db.clone(), publisher, &config);
        let bot = CommandBot::new(client, db.clone(), &config.telegram);

        info!(
            database = %config.database_path.display(),
            channel_id = config.telegram.channel_id,
            fetch_interval_secs = config.fetch_interval.as_secs(),
            notification_interval_secs = config.notification_interval.as_secs(),
            lookup_window_secs = config.effective_lookup_window().as_secs(),
            "news relay initialized"
        );

        Ok(Self {
            db,
            fetcher,
            notifier,
            bot,
        })
    }

    /// Run the fetcher, notifier and command bot until `cancel` fires
    ///
    /// A loop that stops with an error is logged and leaves the others
    /// running. Returns once all three have finished.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let (fetched, notified, polled) = tokio::join!(
            self.fetcher.start(cancel),
            self.notifier.start(cancel),
            self.bot.run(cancel),
        );

        for (name, result) in [("fetcher", fetched), ("notifier", notified), ("bot", polled)] {
            if let Err(e) = result {
                error!(task = name, error = %e, "task stopped with error");
            }
        }

        info!("all tasks stopped");
        Ok(())
    }
}

/// Run the relay until SIGINT or SIGTERM (Ctrl+C off unix), then drain the loops
/// and close the database.
///
/// # Example
///
/// ```no_run
/// use news_relay::{App, Config, run_with_shutdown};
/// use std::path::Path;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::from_file(Path::new("news-relay.json")).await?;
///     let app = App::new(config).await?;
///
///     run_with_shutdown(app).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(app: App) -> Result<()> {
    let cancel = CancellationToken::new();

    let signal_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("shutdown requested");
            cancel.cancel();
        })
    };

    let result = app.run(&cancel).await;
    signal_task.abort();

    let App { db, .. } = app;
    if let Ok(db) = Arc::try_unwrap(db) {
        db.close().await;
    }

    result
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            tokio::signal::ctrl_c().await.ok();
            info!("Received SIGINT signal (Ctrl+C)");
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                info!("Received SIGTERM signal");
            } else {
                error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C signal");
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
