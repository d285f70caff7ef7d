//! RSS and Atom documents to [`Item`]s.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Item;

/// Parse a feed document, trying RSS first and Atom second
pub fn parse_feed(content: &[u8]) -> Result<Vec<Item>> {
    match parse_rss(content) {
        Ok(items) => {
            debug!("Successfully parsed as RSS, found {} items", items.len());
            Ok(items)
        }
        Err(rss_err) => {
            debug!("Failed to parse as RSS: {}, trying Atom", rss_err);
            match parse_atom(content) {
                Ok(items) => {
                    debug!("Successfully parsed as Atom, found {} items", items.len());
                    Ok(items)
                }
                Err(atom_err) => Err(Error::Feed(format!(
                    "Failed to parse feed as RSS or Atom. RSS error: {}. Atom error: {}",
                    rss_err, atom_err
                ))),
            }
        }
    }
}

/// Parse an RSS 2.0 document
///
/// Items without a link are skipped since they cannot be deduplicated.
/// A missing or malformed `pubDate` falls back to the current time.
pub fn parse_rss(content: &[u8]) -> Result<Vec<Item>> {
    let channel = rss::Channel::read_from(content)
        .map_err(|e| Error::Feed(format!("RSS parse error: {}", e)))?;

    let items = channel
        .items()
        .iter()
        .filter_map(|item| {
            let Some(link) = item.link().map(str::trim).filter(|l| !l.is_empty()) else {
                debug!(title = ?item.title(), "skipping RSS item without link");
                return None;
            };

            let published_at = item
                .pub_date()
                .and_then(|date| DateTime::parse_from_rfc2822(date.trim()).ok())
                .unwrap_or_else(now);

            let summary = item
                .description()
                .or_else(|| item.content())
                .unwrap_or("")
                .to_string();

            Some(Item {
                title: item.title().unwrap_or("").to_string(),
                link: link.to_string(),
                summary,
                published_at,
                categories: item
                    .categories()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect(),
            })
        })
        .collect();

    Ok(items)
}

/// Parse an Atom document
pub fn parse_atom(content: &[u8]) -> Result<Vec<Item>> {
    let feed = atom_syndication::Feed::read_from(content)
        .map_err(|e| Error::Feed(format!("Atom parse error: {}", e)))?;

    let items = feed
        .entries()
        .iter()
        .filter_map(|entry| {
            // Prefer the alternate link, fall back to whatever comes first
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|l| l.href().trim())
                .filter(|href| !href.is_empty());
            let Some(link) = link else {
                debug!(id = entry.id(), "skipping Atom entry without link");
                return None;
            };

            let published_at = entry.published().copied().unwrap_or(*entry.updated());

            let summary = entry
                .summary()
                .map(|s| s.as_str().to_string())
                .or_else(|| entry.content().and_then(|c| c.value().map(str::to_string)))
                .unwrap_or_default();

            Some(Item {
                title: entry.title().as_str().to_string(),
                link: link.to_string(),
                summary,
                published_at,
                categories: entry
                    .categories()
                    .iter()
                    .map(|c| c.term().to_string())
                    .collect(),
            })
        })
        .collect();

    Ok(items)
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}
