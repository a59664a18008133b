//! Mutation coordination
//!
//! Every insert or delete shifts the whole cursor-encoded sequence, so a
//! mutation invalidates all cached pages and cursors (not just the affected
//! page), refreshes the count, and refetches page 1 before returning.
//! Several UI surfaces treat "page 1, size 1" as the authoritative latest
//! scan, which is why page 1 is never left to lazy repopulation.

use std::sync::Arc;

use crate::domain::scan::{OwnerId, Scan, ScanId};
use crate::error::HistoryError;
use crate::infrastructure::store::{ImageStore, ScanStore, StoreError};
use crate::navigator::PageNavigator;
use crate::repositories::count::CountTracker;
use crate::repositories::pages::HistoryCaches;

pub struct MutationCoordinator<S, I> {
    store: Arc<S>,
    images: Arc<I>,
    caches: HistoryCaches,
    count: CountTracker<S>,
    navigator: PageNavigator<S, I>,
    /// Page size the UI reads page 1 at; the family the forced refetch
    /// repopulates.
    page_size: u32,
}

impl<S: ScanStore, I: ImageStore> MutationCoordinator<S, I> {
    pub fn new(
        store: Arc<S>,
        images: Arc<I>,
        caches: HistoryCaches,
        count: CountTracker<S>,
        navigator: PageNavigator<S, I>,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            images,
            caches,
            count,
            navigator,
            page_size,
        }
    }

    /// Delete one scan and return the refreshed total.
    ///
    /// The backing image object goes first (a missing object counts as
    /// already deleted), then the document. A document-delete failure after
    /// the object was removed surfaces as [`HistoryError::PartialDelete`];
    /// retrying the whole call is safe because the object step is
    /// idempotent.
    pub async fn delete_scan(
        &self,
        owner: &OwnerId,
        id: &ScanId,
        storage_path: Option<&str>,
    ) -> Result<u64, HistoryError> {
        let object_removed = match storage_path {
            Some(path) => match self.images.delete_object(path).await {
                Ok(()) => true,
                Err(StoreError::NotFound) => {
                    tracing::debug!(scan = %id, storage_path = %path, "image object already absent");
                    true
                }
                Err(err) => return Err(err.into()),
            },
            None => false,
        };

        if let Err(err) = self.store.delete(owner, id).await {
            if object_removed {
                return Err(HistoryError::PartialDelete {
                    id: id.clone(),
                    source: err,
                });
            }
            return Err(err.into());
        }

        tracing::info!(scan = %id, "scan deleted");
        self.settle_after_mutation(owner).await
    }

    /// Write a new scan document and run the same invalidate/refresh
    /// sequence, since an insert also shifts every page boundary.
    pub async fn create_scan(&self, owner: &OwnerId, scan: Scan) -> Result<ScanId, HistoryError> {
        let id = self.store.create(owner, scan).await?;
        tracing::info!(scan = %id, "scan created");
        self.settle_after_mutation(owner).await?;
        Ok(id)
    }

    /// Invalidate everything, refresh the count, and force page 1 back into
    /// the cache from the store.
    async fn settle_after_mutation(&self, owner: &OwnerId) -> Result<u64, HistoryError> {
        self.caches.clear().await;
        let count = self.count.refresh(owner).await?;
        self.navigator.page(owner, 1, self.page_size).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::page::PageKey;
    use crate::infrastructure::memory::{sample_scan, MemoryImageStore, MemoryScanStore};

    fn owner() -> OwnerId {
        OwnerId::new("user-1")
    }

    struct Fixture {
        store: MemoryScanStore,
        images: MemoryImageStore,
        caches: HistoryCaches,
        navigator: PageNavigator<MemoryScanStore, MemoryImageStore>,
        coordinator: MutationCoordinator<MemoryScanStore, MemoryImageStore>,
    }

    async fn fixture(scan_count: u32) -> Fixture {
        let store = MemoryScanStore::new();
        store.seed(&owner(), (1..=scan_count).map(sample_scan)).await;
        let images = MemoryImageStore::new();
        for n in 1..=scan_count {
            images
                .insert_object(
                    format!("scans/demo/scan-{n}.jpg"),
                    format!("https://cdn.example/scan-{n}.jpg"),
                )
                .await;
        }

        let store_arc = Arc::new(store.clone());
        let images_arc = Arc::new(images.clone());
        let caches = HistoryCaches::new();
        let count = CountTracker::new(Arc::clone(&store_arc));
        let navigator = PageNavigator::new(
            Arc::clone(&store_arc),
            Arc::clone(&images_arc),
            caches.clone(),
        );
        let coordinator = MutationCoordinator::new(
            store_arc,
            images_arc,
            caches.clone(),
            count,
            navigator.clone(),
            5,
        );

        Fixture {
            store,
            images,
            caches,
            navigator,
            coordinator,
        }
    }

    #[tokio::test]
    async fn test_delete_invalidates_and_refetches_page_one() {
        let f = fixture(12).await;
        f.navigator.page(&owner(), 3, 5).await.expect("walk");
        assert_eq!(f.caches.cached_pages().await, 3);

        let count = f
            .coordinator
            .delete_scan(&owner(), &ScanId::new("scan-12"), Some("scans/demo/scan-12.jpg"))
            .await
            .expect("delete");

        assert_eq!(count, 11);
        // Only the forced page-1 refetch survives the invalidation.
        assert_eq!(f.caches.cached_pages().await, 1);
        let page_one = f.caches.page(&PageKey::new(5, 1)).await.expect("page 1");
        assert_eq!(page_one[0].id.as_str(), "scan-11");
        assert_eq!(f.images.deleted_paths().await, vec!["scans/demo/scan-12.jpg"]);
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_object() {
        let f = fixture(3).await;

        let count = f
            .coordinator
            .delete_scan(&owner(), &ScanId::new("scan-2"), Some("scans/demo/gone.jpg"))
            .await
            .expect("delete");

        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_delete_without_storage_path_skips_object_store() {
        let f = fixture(3).await;

        let count = f
            .coordinator
            .delete_scan(&owner(), &ScanId::new("scan-1"), None)
            .await
            .expect("delete");

        assert_eq!(count, 2);
        assert_eq!(f.images.deleted_paths().await, Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported_distinctly() {
        let f = fixture(3).await;
        f.store.fail_next_delete().await;

        let err = f
            .coordinator
            .delete_scan(&owner(), &ScanId::new("scan-3"), Some("scans/demo/scan-3.jpg"))
            .await
            .expect_err("partial failure");

        assert!(matches!(err, HistoryError::PartialDelete { .. }));
        assert!(err.is_retryable());
        // The object really is gone; retrying the same call succeeds.
        let count = f
            .coordinator
            .delete_scan(&owner(), &ScanId::new("scan-3"), Some("scans/demo/scan-3.jpg"))
            .await
            .expect("retry");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_document_failure_without_object_step_is_plain_store_error() {
        let f = fixture(3).await;
        f.store.fail_next_delete().await;

        let err = f
            .coordinator
            .delete_scan(&owner(), &ScanId::new("scan-3"), None)
            .await
            .expect_err("failure");

        assert!(matches!(err, HistoryError::Store(_)));
    }

    #[tokio::test]
    async fn test_create_invalidates_and_refetches_page_one() {
        let f = fixture(5).await;
        f.navigator.page(&owner(), 1, 5).await.expect("page");

        let id = f
            .coordinator
            .create_scan(&owner(), sample_scan(20))
            .await
            .expect("create");

        assert_eq!(id.as_str(), "scan-20");
        let page_one = f.caches.page(&PageKey::new(5, 1)).await.expect("page 1");
        assert_eq!(page_one[0].id.as_str(), "scan-20");
    }

    #[tokio::test]
    async fn test_failed_count_refresh_aborts_before_page_refetch() {
        let f = fixture(5).await;
        f.store.fail_next_count().await;

        let err = f
            .coordinator
            .delete_scan(&owner(), &ScanId::new("scan-5"), None)
            .await
            .expect_err("count failure");

        assert!(err.is_retryable());
        // The invalidation already happened; page 1 was not repopulated.
        assert!(f.caches.is_empty().await);
    }
}
