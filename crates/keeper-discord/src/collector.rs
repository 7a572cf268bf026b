//! Backward pagination over a channel's message history.
//!
//! Discord returns at most 100 messages per request, newest first. The
//! collector walks history with a `before` cursor set to the oldest id seen so
//! far and stops at the first page shorter than the requested size.

use tracing::{debug, warn};

use crate::api::DiscordApi;
use crate::error::Result;
use crate::types::Message;

/// Largest page Discord will serve.
pub const MAX_PAGE_SIZE: usize = 100;

/// Paging parameters for one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    /// Requested page size; clamped to `1..=100`.
    pub page_size: usize,
    /// Stop after this many pages and mark the result truncated.
    /// `None` walks the whole history.
    pub max_pages: Option<usize>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: None,
        }
    }
}

impl CollectOptions {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// A ceiling of zero is raised to one page; a walk always fetches.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages.map(|n| n.max(1));
        self
    }

    /// Page size actually sent to Discord.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Result of a walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    /// Accepted items in fetch order (newest first).
    pub items: Vec<T>,
    /// Number of page requests issued.
    pub pages_fetched: usize,
    /// True when `max_pages` stopped the walk before history ran out.
    pub truncated: bool,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pages_fetched: 0,
            truncated: false,
        }
    }
}

impl<T> Collection<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Collection<U> {
        Collection {
            items: self.items.into_iter().map(f).collect(),
            pages_fetched: self.pages_fetched,
            truncated: self.truncated,
        }
    }
}

/// Collects every message in `channel_id` accepted by `keep`.
///
/// `keep` only decides what is accumulated. Termination and the cursor are
/// driven by the raw page: a page where every message was filtered out still
/// counts as full if Discord returned `page_size` messages.
///
/// A failed page request aborts the walk. Nothing is mutated, so the caller
/// can simply drop the partial result.
pub async fn collect_messages<A, F>(
    api: &A,
    channel_id: &str,
    options: CollectOptions,
    mut keep: F,
) -> Result<Collection<Message>>
where
    A: DiscordApi + ?Sized,
    F: FnMut(&Message) -> bool,
{
    let page_size = options.effective_page_size();
    let mut cursor: Option<String> = None;
    let mut collection = Collection::default();

    loop {
        if let Some(max_pages) = options.max_pages {
            if collection.pages_fetched >= max_pages {
                warn!(
                    channel_id,
                    max_pages,
                    collected = collection.items.len(),
                    "page ceiling reached, history truncated"
                );
                collection.truncated = true;
                break;
            }
        }

        let page = api
            .list_messages(channel_id, page_size, cursor.as_deref())
            .await?;
        collection.pages_fetched += 1;

        let raw_len = page.len();
        if let Some(oldest) = page.last() {
            cursor = Some(oldest.id.clone());
        }

        let before = collection.items.len();
        collection.items.extend(page.into_iter().filter(|m| keep(m)));

        debug!(
            channel_id,
            page = collection.pages_fetched,
            fetched = raw_len,
            kept = collection.items.len() - before,
            total = collection.items.len(),
            "fetched message page"
        );

        if raw_len < page_size {
            break;
        }
    }

    Ok(collection)
}

/// Like [`collect_messages`] but keeps only the ids.
pub async fn collect_message_ids<A, F>(
    api: &A,
    channel_id: &str,
    options: CollectOptions,
    keep: F,
) -> Result<Collection<String>>
where
    A: DiscordApi + ?Sized,
    F: FnMut(&Message) -> bool,
{
    let collection = collect_messages(api, channel_id, options, keep).await?;
    Ok(collection.map(|m| m.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{message, MockDiscord};

    fn seeded(count: u64, pinned_every: Option<u64>) -> MockDiscord {
        let messages = (1..=count)
            .map(|i| {
                let pinned = pinned_every.map_or(false, |n| i % n == 0);
                message(i, "1", "wren", i as i64, pinned)
            })
            .collect();
        MockDiscord::new().with_messages("chan", messages)
    }

    #[tokio::test]
    async fn test_full_pages_then_short_page() {
        let api = seeded(337, None);

        let collection = collect_messages(&api, "chan", CollectOptions::new(100), |_| true)
            .await
            .unwrap();

        assert_eq!(collection.pages_fetched, 4);
        assert_eq!(collection.len(), 337);
        assert!(!collection.truncated);

        let sizes: Vec<usize> = api.page_sizes();
        assert_eq!(sizes, vec![100, 100, 100, 37]);
    }

    #[tokio::test]
    async fn test_cursor_advances_to_oldest_raw_message() {
        let api = seeded(250, None);

        collect_messages(&api, "chan", CollectOptions::new(100), |_| true)
            .await
            .unwrap();

        let cursors: Vec<Option<String>> =
            api.list_calls().into_iter().map(|c| c.before).collect();
        assert_eq!(
            cursors,
            vec![None, Some("151".to_string()), Some("51".to_string())]
        );
    }

    #[tokio::test]
    async fn test_filter_does_not_affect_termination() {
        let api = seeded(337, None);

        let collection = collect_messages(&api, "chan", CollectOptions::new(100), |_| false)
            .await
            .unwrap();

        assert!(collection.is_empty());
        assert_eq!(collection.pages_fetched, 4);
    }

    #[tokio::test]
    async fn test_predicate_filters_pinned() {
        let api = seeded(10, Some(5));

        let ids = collect_message_ids(&api, "chan", CollectOptions::new(3), |m| !m.pinned)
            .await
            .unwrap();

        assert_eq!(ids.items, vec!["9", "8", "7", "6", "4", "3", "2", "1"]);
        // 10 messages at 3 per page: 3, 3, 3, 1.
        assert_eq!(ids.pages_fetched, 4);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_one_empty_page() {
        let api = seeded(200, None);

        let collection = collect_messages(&api, "chan", CollectOptions::default(), |_| true)
            .await
            .unwrap();

        assert_eq!(collection.len(), 200);
        assert_eq!(api.page_sizes(), vec![100, 100, 0]);
    }

    #[tokio::test]
    async fn test_empty_channel() {
        let api = MockDiscord::new();

        let collection = collect_messages(&api, "chan", CollectOptions::default(), |_| true)
            .await
            .unwrap();

        assert!(collection.is_empty());
        assert_eq!(collection.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_page_ceiling_truncates() {
        let api = seeded(500, None);

        let collection = collect_messages(
            &api,
            "chan",
            CollectOptions::new(100).with_max_pages(Some(2)),
            |_| true,
        )
        .await
        .unwrap();

        assert!(collection.truncated);
        assert_eq!(collection.pages_fetched, 2);
        assert_eq!(collection.len(), 200);
    }

    #[tokio::test]
    async fn test_zero_ceiling_still_fetches_one_page() {
        let api = seeded(150, None);

        let collection = collect_messages(
            &api,
            "chan",
            CollectOptions::new(100).with_max_pages(Some(0)),
            |_| true,
        )
        .await
        .unwrap();

        assert!(collection.truncated);
        assert_eq!(collection.pages_fetched, 1);
        assert_eq!(collection.len(), 100);
    }

    #[tokio::test]
    async fn test_ceiling_not_hit_when_history_ends() {
        let api = seeded(150, None);

        let collection = collect_messages(
            &api,
            "chan",
            CollectOptions::new(100).with_max_pages(Some(2)),
            |_| true,
        )
        .await
        .unwrap();

        assert!(!collection.truncated);
        assert_eq!(collection.len(), 150);
    }

    #[tokio::test]
    async fn test_page_failure_aborts() {
        let api = seeded(300, None).fail_list_after(1);

        let err = collect_messages(&api, "chan", CollectOptions::default(), |_| true)
            .await
            .unwrap_err();

        assert!(err.status().is_some());
        assert_eq!(api.list_calls().len(), 2);
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(CollectOptions::new(500).effective_page_size(), 100);
        assert_eq!(CollectOptions::new(0).effective_page_size(), 1);
        assert_eq!(CollectOptions::new(37).effective_page_size(), 37);
    }
}
