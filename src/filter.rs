//! Keyword block-list applied to feed items before they are stored

use tracing::debug;

use crate::types::Item;

/// Case-insensitive keyword block-list
///
/// An item is blocked when any keyword equals one of its category labels or
/// appears anywhere in its title. An empty list blocks nothing.
#[derive(Clone, Debug, Default)]
pub struct KeywordFilter {
    /// Lowercased, trimmed, non-empty keywords
    keywords: Vec<String>,
}

impl KeywordFilter {
    /// Build a filter from configured keywords
    ///
    /// Blank keywords are ignored, otherwise `""` would match every title.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self { keywords }
    }

    /// Whether the filter has no keywords
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Whether `item` must be dropped
    pub fn should_skip(&self, item: &Item) -> bool {
        if self.keywords.is_empty() {
            return false;
        }

        let title = item.title.to_lowercase();
        let categories: Vec<String> = item
            .categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();

        for keyword in &self.keywords {
            if categories.iter().any(|c| c == keyword) {
                debug!(link = %item.link, keyword = %keyword, "item blocked by category");
                return true;
            }
            if title.contains(keyword.as_str()) {
                debug!(link = %item.link, keyword = %keyword, "item blocked by title");
                return true;
            }
        }

        false
    }
}
