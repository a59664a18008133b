//! The page navigator: random page-number access over a forward-only store
//!
//! Reaching page N requires the cursor handed back by page N-1, so a cold
//! request walks forward from page 1, caching every page and cursor it
//! passes. Warm requests are pure cache hits; requests past the end of the
//! collection resolve to an empty page.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::page::{CursorToken, PageKey};
use crate::domain::scan::{OwnerId, Scan};
use crate::error::HistoryError;
use crate::hydrator::hydrate_page;
use crate::infrastructure::store::{ImageStore, ScanStore};
use crate::repositories::pages::HistoryCaches;

pub struct PageNavigator<S, I> {
    store: Arc<S>,
    images: Arc<I>,
    caches: HistoryCaches,
    /// Serializes cache-miss walks. A caller that queued behind an identical
    /// request finds the page cached once it holds the lock, so concurrent
    /// misses collapse to a single network walk.
    walk_lock: Arc<Mutex<()>>,
}

impl<S, I> Clone for PageNavigator<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            images: Arc::clone(&self.images),
            caches: self.caches.clone(),
            walk_lock: Arc::clone(&self.walk_lock),
        }
    }
}

impl<S: ScanStore, I: ImageStore> PageNavigator<S, I> {
    pub fn new(store: Arc<S>, images: Arc<I>, caches: HistoryCaches) -> Self {
        Self {
            store,
            images,
            caches,
            walk_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Return the hydrated records of `page_number` (1-based) at
    /// `page_size`.
    ///
    /// Cached pages are returned without network access. Otherwise the
    /// navigator walks from page 1, reusing every cached cursor along the
    /// way, fetches the target, and populates both caches. A page past the
    /// end of the collection is an empty list, not an error, and is not
    /// cached. Store failures abort the walk with the caches left exactly
    /// as they were for every key not yet written.
    pub async fn page(
        &self,
        owner: &OwnerId,
        page_number: u32,
        page_size: u32,
    ) -> Result<Vec<Scan>, HistoryError> {
        if page_number < 1 || page_size < 1 {
            return Err(HistoryError::InvalidPage {
                page_number,
                page_size,
            });
        }

        let key = PageKey::new(page_size, page_number);
        if let Some(hit) = self.caches.page(&key).await {
            return Ok(hit);
        }

        let _walk = self.walk_lock.lock().await;
        // Re-check: the walk we queued behind may have fetched this page.
        if let Some(hit) = self.caches.page(&key).await {
            return Ok(hit);
        }

        let generation = self.caches.generation().await;
        let mut cursor: Option<CursorToken> = None;

        for hop in 1..page_number {
            let hop_key = PageKey::new(page_size, hop);
            if let Some(cached) = self.caches.cursor(&hop_key).await {
                cursor = Some(cached);
                continue;
            }

            let batch = self
                .store
                .fetch_page(owner, page_size, cursor.as_ref())
                .await?;
            let scans = hydrate_page(self.images.as_ref(), batch.scans).await;
            let next = batch.next_cursor;
            self.caches
                .insert(generation, hop_key, scans, next.clone())
                .await;

            match next {
                Some(token) => cursor = Some(token),
                None => {
                    tracing::debug!(
                        page_number,
                        page_size,
                        exhausted_at = hop,
                        "collection ended before the requested page"
                    );
                    return Ok(Vec::new());
                }
            }
        }

        let batch = self
            .store
            .fetch_page(owner, page_size, cursor.as_ref())
            .await?;
        let scans = hydrate_page(self.images.as_ref(), batch.scans).await;
        self.caches
            .insert(generation, key, scans.clone(), batch.next_cursor)
            .await;

        Ok(scans)
    }
}
