//! Periodic fetch-filter-store cycle
//!
//! Each cycle loads every source, fans out one task per source on a
//! [`JoinSet`], and waits for all of them before returning. A source that
//! cannot be retrieved, parsed or persisted is logged and skipped; siblings are
//! unaffected. Only a failure to load the source list fails the cycle.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{Config, FailurePolicy};
use crate::error::Result;
use crate::feed::FeedFetcher;
use crate::filter::KeywordFilter;
use crate::periodic::run_periodic;
use crate::storage::{ArticleStore, SourceProvider};
use crate::types::{Item, NewArticle, Source, StoreOutcome};

/// Summary of one fetch cycle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Sources loaded from the registry
    pub sources: usize,
    /// Sources whose retrieval or persistence failed
    pub failed_sources: usize,
    /// Sources abandoned because of cancellation
    pub cancelled_sources: usize,
    /// Items dropped by the keyword filter
    pub filtered: usize,
    /// New articles written to the store
    pub stored: usize,
    /// Items the store already knew about
    pub duplicates: usize,
}

/// Per-source counters
#[derive(Debug, Default)]
struct SourceStats {
    filtered: usize,
    stored: usize,
    duplicates: usize,
}

enum SourceOutcome {
    Done(SourceStats),
    Failed,
    Cancelled,
}

/// Owns the fetch schedule
pub struct Fetcher {
    sources: Arc<dyn SourceProvider>,
    store: Arc<dyn ArticleStore>,
    feeds: Arc<dyn FeedFetcher>,
    filter: Arc<KeywordFilter>,
    interval: Duration,
}

impl Fetcher {
    /// Create a fetcher from its collaborators and the fetch settings in `config`
    pub fn new(
        sources: Arc<dyn SourceProvider>,
        store: Arc<dyn ArticleStore>,
        feeds: Arc<dyn FeedFetcher>,
        config: &Config,
    ) -> Self {
        Self {
            sources,
            store,
            feeds,
            filter: Arc::new(KeywordFilter::new(&config.filter_keywords)),
            interval: config.fetch_interval,
        }
    }

    /// Run a cycle now and then every fetch interval until `cancel` fires
    ///
    /// Returns `Ok(())` on cancellation. Per-source failures never reach the
    /// loop, so the only cycle error is a failed source-list load, which always
    /// stops it regardless of the configured [`FailurePolicy`].
    pub async fn start(&self, cancel: &CancellationToken) -> Result<()> {
        run_periodic("fetcher", self.interval, cancel, FailurePolicy::Abort, || async move {
            self.fetch_cycle(cancel).await.map(|_| ())
        })
        .await
    }

    /// Fetch every source once and store what survives the filter
    ///
    /// Returns after all per-source tasks have finished.
    pub async fn fetch_cycle(&self, cancel: &CancellationToken) -> Result<FetchReport> {
        let sources = self.sources.list_sources().await.inspect_err(|e| {
            error!(error = %e, "failed to load sources");
        })?;

        let mut report = FetchReport {
            sources: sources.len(),
            ..FetchReport::default()
        };

        if sources.is_empty() {
            debug!("no sources configured, nothing to fetch");
            return Ok(report);
        }

        info!(sources = sources.len(), "fetch cycle started");

        let mut tasks = JoinSet::new();
        for source in sources {
            let store = Arc::clone(&self.store);
            let feeds = Arc::clone(&self.feeds);
            let filter = Arc::clone(&self.filter);
            let cancel = cancel.clone();
            tasks.spawn(async move { process_source(source, feeds, store, filter, cancel).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(SourceOutcome::Done(stats)) => {
                    report.filtered += stats.filtered;
                    report.stored += stats.stored;
                    report.duplicates += stats.duplicates;
                }
                Ok(SourceOutcome::Failed) => report.failed_sources += 1,
                Ok(SourceOutcome::Cancelled) => report.cancelled_sources += 1,
                Err(e) => {
                    error!(error = %e, "source task panicked");
                    report.failed_sources += 1;
                }
            }
        }

        info!(
            sources = report.sources,
            failed = report.failed_sources,
            stored = report.stored,
            duplicates = report.duplicates,
            filtered = report.filtered,
            "fetch cycle finished"
        );

        Ok(report)
    }
}

async fn process_source(
    source: Source,
    feeds: Arc<dyn FeedFetcher>,
    store: Arc<dyn ArticleStore>,
    filter: Arc<KeywordFilter>,
    cancel: CancellationToken,
) -> SourceOutcome {
    let items = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(source_id = %source.id, "fetch cancelled");
            return SourceOutcome::Cancelled;
        }
        res = feeds.fetch(&source) => res,
    };

    let items = match items {
        Ok(items) => items,
        Err(e) => {
            warn!(source_id = %source.id, url = %source.feed_url, error = %e, "failed to fetch source");
            return SourceOutcome::Failed;
        }
    };

    match store_items(&source, items, store.as_ref(), &filter).await {
        Ok(stats) => {
            debug!(
                source_id = %source.id,
                stored = stats.stored,
                duplicates = stats.duplicates,
                filtered = stats.filtered,
                "source processed"
            );
            SourceOutcome::Done(stats)
        }
        Err(e) => {
            error!(source_id = %source.id, error = %e, "failed to store articles");
            SourceOutcome::Failed
        }
    }
}

async fn store_items(
    source: &Source,
    items: Vec<Item>,
    store: &dyn ArticleStore,
    filter: &KeywordFilter,
) -> Result<SourceStats> {
    let mut stats = SourceStats::default();

    for item in items {
        if filter.should_skip(&item) {
            stats.filtered += 1;
            continue;
        }

        let article = NewArticle {
            source_id: source.id,
            title: item.title,
            link: item.link,
            summary: item.summary,
            published_at: item.published_at.with_timezone(&Utc),
        };

        match store.store(&article).await? {
            StoreOutcome::Inserted(id) => {
                debug!(article_id = %id, link = %article.link, "stored new article");
                stats.stored += 1;
            }
            StoreOutcome::Duplicate => {
                debug!(link = %article.link, "article already known");
                stats.duplicates += 1;
            }
        }
    }

    Ok(stats)
}
