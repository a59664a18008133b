use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::page::{CursorToken, PageKey};
use crate::domain::scan::Scan;

#[derive(Default)]
struct CacheState {
    /// Bumped on every clear. Writes carrying an older generation are from
    /// a fetch that started before an invalidation and are dropped.
    generation: u64,
    pages: HashMap<PageKey, Vec<Scan>>,
    cursors: HashMap<PageKey, CursorToken>,
}

/// The page cache and cursor cache, shared behind one lock.
///
/// The cursor stored under key `(s, n)` is the starting cursor for fetching
/// page `(s, n + 1)`. Entries are only ever added by the navigator and only
/// ever removed in bulk, by the mutation coordinator or session teardown.
#[derive(Clone, Default)]
pub struct HistoryCaches {
    inner: Arc<Mutex<CacheState>>,
}

impl HistoryCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cache generation. A fetch records this before suspending and
    /// hands it back with its write.
    pub async fn generation(&self) -> u64 {
        self.inner.lock().await.generation
    }

    pub async fn page(&self, key: &PageKey) -> Option<Vec<Scan>> {
        self.inner.lock().await.pages.get(key).cloned()
    }

    pub async fn cursor(&self, key: &PageKey) -> Option<CursorToken> {
        self.inner.lock().await.cursors.get(key).cloned()
    }

    /// Store a fetched page and, when the collection continues past it, the
    /// cursor for the page after it. Returns `false` when the write was
    /// dropped because the caches were cleared since `generation` was read.
    pub async fn insert(
        &self,
        generation: u64,
        key: PageKey,
        scans: Vec<Scan>,
        next_cursor: Option<CursorToken>,
    ) -> bool {
        let mut state = self.inner.lock().await;
        if state.generation != generation {
            tracing::debug!(
                page_number = key.page_number(),
                page_size = key.page_size(),
                "dropping stale cache write from a superseded session"
            );
            return false;
        }
        state.pages.insert(key, scans);
        if let Some(cursor) = next_cursor {
            state.cursors.insert(key, cursor);
        }
        true
    }

    /// Invalidate everything and retire any in-flight writes.
    pub async fn clear(&self) {
        let mut state = self.inner.lock().await;
        state.generation += 1;
        state.pages.clear();
        state.cursors.clear();
    }

    pub async fn is_empty(&self) -> bool {
        let state = self.inner.lock().await;
        state.pages.is_empty() && state.cursors.is_empty()
    }

    pub async fn cached_pages(&self) -> usize {
        self.inner.lock().await.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::infrastructure::memory::sample_scan;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let caches = HistoryCaches::new();
        let key = PageKey::new(5, 1);
        let generation = caches.generation().await;

        let written = caches
            .insert(
                generation,
                key,
                vec![sample_scan(1)],
                Some(CursorToken::new("after:scan-1")),
            )
            .await;
        assert!(written);

        let page = caches.page(&key).await.expect("cached page");
        assert_eq!(page.len(), 1);
        assert_eq!(caches.cursor(&key).await.expect("cursor").as_str(), "after:scan-1");
        assert!(caches.page(&PageKey::new(5, 2)).await.is_none());
    }

    #[tokio::test]
    async fn test_last_page_has_no_cursor_entry() {
        let caches = HistoryCaches::new();
        let key = PageKey::new(5, 3);
        let generation = caches.generation().await;

        caches.insert(generation, key, vec![sample_scan(1)], None).await;

        assert!(caches.page(&key).await.is_some());
        assert!(caches.cursor(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_empties_both_maps() {
        let caches = HistoryCaches::new();
        let generation = caches.generation().await;
        caches
            .insert(
                generation,
                PageKey::new(5, 1),
                vec![sample_scan(1)],
                Some(CursorToken::new("c")),
            )
            .await;

        caches.clear().await;

        assert!(caches.is_empty().await);
        assert_eq!(caches.generation().await, generation + 1);
    }

    #[tokio::test]
    async fn test_stale_generation_write_is_dropped() {
        let caches = HistoryCaches::new();
        let stale = caches.generation().await;

        // An invalidation lands while the fetch is in flight.
        caches.clear().await;

        let written = caches
            .insert(stale, PageKey::new(5, 1), vec![sample_scan(1)], None)
            .await;
        assert!(!written);
        assert!(caches.is_empty().await);
    }

    #[tokio::test]
    async fn test_page_size_families_are_independent() {
        let caches = HistoryCaches::new();
        let generation = caches.generation().await;

        caches
            .insert(generation, PageKey::new(5, 1), vec![sample_scan(1)], None)
            .await;
        caches
            .insert(generation, PageKey::new(10, 1), vec![sample_scan(1), sample_scan(2)], None)
            .await;

        assert_eq!(caches.page(&PageKey::new(5, 1)).await.expect("page").len(), 1);
        assert_eq!(caches.page(&PageKey::new(10, 1)).await.expect("page").len(), 2);
    }
}
