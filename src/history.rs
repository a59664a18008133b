//! The `ScanHistory` facade
//!
//! The only type the rest of the application talks to. Owns the caches, the
//! navigator, the count tracker, and the mutation coordinator, and scopes
//! all of them to the active user session.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::scan::{OwnerId, Scan, ScanId};
use crate::error::HistoryError;
use crate::infrastructure::config::Config;
use crate::infrastructure::store::{ImageStore, ScanStore};
use crate::mutation::MutationCoordinator;
use crate::navigator::PageNavigator;
use crate::repositories::count::CountTracker;
use crate::repositories::pages::HistoryCaches;

pub struct ScanHistory<S, I> {
    owner: Arc<Mutex<Option<OwnerId>>>,
    caches: HistoryCaches,
    count: CountTracker<S>,
    navigator: PageNavigator<S, I>,
    mutations: MutationCoordinator<S, I>,
    page_size: u32,
}

impl<S: ScanStore, I: ImageStore> ScanHistory<S, I> {
    /// Build the history core over the given store adapters. `page_size` is
    /// the size family the UI reads and the one mutations repopulate page 1
    /// in.
    pub fn new(store: S, images: I, page_size: u32) -> Self {
        let store = Arc::new(store);
        let images = Arc::new(images);
        let caches = HistoryCaches::new();
        let count = CountTracker::new(Arc::clone(&store));
        let navigator = PageNavigator::new(Arc::clone(&store), Arc::clone(&images), caches.clone());
        let mutations = MutationCoordinator::new(
            store,
            images,
            caches.clone(),
            count.clone(),
            navigator.clone(),
            page_size,
        );

        Self {
            owner: Arc::new(Mutex::new(None)),
            caches,
            count,
            navigator,
            mutations,
            page_size,
        }
    }

    pub fn with_config(store: S, images: I, config: &Config) -> Self {
        Self::new(store, images, config.page_size)
    }

    /// Install a user session. Any state from a previous session is
    /// discarded, including writes from fetches still in flight.
    pub async fn sign_in(&self, owner: OwnerId) {
        *self.owner.lock().await = Some(owner);
        self.caches.clear().await;
        self.count.reset().await;
    }

    pub async fn sign_out(&self) {
        *self.owner.lock().await = None;
        self.caches.clear().await;
        self.count.reset().await;
    }

    pub async fn current_owner(&self) -> Option<OwnerId> {
        self.owner.lock().await.clone()
    }

    /// Hydrated records of `page_number` at `page_size`; an empty list when
    /// no session is active or the page lies past the end.
    pub async fn page(&self, page_number: u32, page_size: u32) -> Result<Vec<Scan>, HistoryError> {
        let Some(owner) = self.current_owner().await else {
            return Ok(Vec::new());
        };
        self.navigator.page(&owner, page_number, page_size).await
    }

    /// The most recent scan, if any. Defined as the first record of page
    /// `(1, 1)`, the view the dashboard's "latest scan" card uses.
    pub async fn latest(&self) -> Result<Option<Scan>, HistoryError> {
        Ok(self.page(1, 1).await?.into_iter().next())
    }

    /// Issue a fresh exact-count query. The cached value survives a failed
    /// refresh.
    pub async fn refresh_count(&self) -> Result<u64, HistoryError> {
        let owner = self.require_owner().await?;
        Ok(self.count.refresh(&owner).await?)
    }

    /// Last refreshed count; display-only, never used to bound pagination.
    pub async fn count(&self) -> u64 {
        self.count.current().await
    }

    pub async fn delete_scan(
        &self,
        id: &ScanId,
        storage_path: Option<&str>,
    ) -> Result<u64, HistoryError> {
        let owner = self.require_owner().await?;
        self.mutations.delete_scan(&owner, id, storage_path).await
    }

    pub async fn create_scan(&self, scan: Scan) -> Result<ScanId, HistoryError> {
        let owner = self.require_owner().await?;
        self.mutations.create_scan(&owner, scan).await
    }

    /// Drop every cached page and cursor. For callers switching the
    /// page-length control: size families never invalidate each other, so
    /// the switch clears explicitly instead.
    pub async fn clear_all(&self) {
        self.caches.clear().await;
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn require_owner(&self) -> Result<OwnerId, HistoryError> {
        self.current_owner().await.ok_or(HistoryError::NoSession)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::infrastructure::memory::{sample_scan, MemoryImageStore, MemoryScanStore};

    fn owner() -> OwnerId {
        OwnerId::new("user-1")
    }

    async fn history_with(
        scan_count: u32,
    ) -> (ScanHistory<MemoryScanStore, MemoryImageStore>, MemoryScanStore) {
        let store = MemoryScanStore::new();
        store.seed(&owner(), (1..=scan_count).map(sample_scan)).await;
        let history = ScanHistory::new(store.clone(), MemoryImageStore::new(), 5);
        (history, store)
    }

    #[tokio::test]
    async fn test_signed_out_page_is_empty_without_network() {
        let (history, store) = history_with(5).await;

        let page = history.page(1, 5).await.expect("page");
        assert_eq!(page, vec![]);
        assert_eq!(store.fetch_calls().await, 0);
    }

    #[tokio::test]
    async fn test_signed_in_page_fetches() {
        let (history, _) = history_with(5).await;
        history.sign_in(owner()).await;

        let page = history.page(1, 5).await.expect("page");
        assert_eq!(page.len(), 5);
    }

    #[tokio::test]
    async fn test_sign_out_resets_everything() {
        let (history, store) = history_with(5).await;
        history.sign_in(owner()).await;
        history.page(1, 5).await.expect("page");
        history.refresh_count().await.expect("count");

        history.sign_out().await;

        assert_eq!(history.count().await, 0);
        assert_eq!(history.page(1, 5).await.expect("page"), vec![]);
        // Signing back in starts cold.
        history.sign_in(owner()).await;
        history.page(1, 5).await.expect("page");
        assert_eq!(store.fetch_calls().await, 2);
    }

    #[tokio::test]
    async fn test_latest_is_head_of_page_one() {
        let (history, _) = history_with(7).await;
        history.sign_in(owner()).await;

        let latest = history.latest().await.expect("latest").expect("some scan");
        assert_eq!(latest.id.as_str(), "scan-7");
    }

    #[tokio::test]
    async fn test_latest_on_empty_collection() {
        let (history, _) = history_with(0).await;
        history.sign_in(owner()).await;

        assert_eq!(history.latest().await.expect("latest"), None);
    }

    #[tokio::test]
    async fn test_mutations_require_a_session() {
        let (history, _) = history_with(3).await;

        let err = history
            .delete_scan(&ScanId::new("scan-1"), None)
            .await
            .expect_err("no session");
        assert!(matches!(err, HistoryError::NoSession));

        let err = history.refresh_count().await.expect_err("no session");
        assert!(matches!(err, HistoryError::NoSession));
    }

    #[tokio::test]
    async fn test_clear_all_forces_refetch() {
        let (history, store) = history_with(5).await;
        history.sign_in(owner()).await;
        history.page(1, 5).await.expect("page");
        assert_eq!(store.fetch_calls().await, 1);

        history.clear_all().await;
        history.page(1, 5).await.expect("page");
        assert_eq!(store.fetch_calls().await, 2);
    }

    #[tokio::test]
    async fn test_delete_through_facade_returns_new_count() {
        let (history, _) = history_with(5).await;
        history.sign_in(owner()).await;

        let count = history
            .delete_scan(&ScanId::new("scan-5"), Some("scans/demo/scan-5.jpg"))
            .await
            .expect("delete");

        assert_eq!(count, 4);
        assert_eq!(history.count().await, 4);
        let latest = history.latest().await.expect("latest").expect("some scan");
        assert_eq!(latest.id.as_str(), "scan-4");
    }
}
