use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::scan::OwnerId;
use crate::infrastructure::store::{ScanStore, StoreError};

/// Cached exact total of the owner's scans.
///
/// The count is an independent, separately-priced store query; it is never
/// derived from cached pages, which are partial and cursor-walked. On a
/// failed refresh the last known value is kept: stale is acceptable for
/// display, and pagination never bounds its walk by the count anyway.
pub struct CountTracker<S> {
    store: Arc<S>,
    last_count: Arc<Mutex<u64>>,
}

impl<S> Clone for CountTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            last_count: Arc::clone(&self.last_count),
        }
    }
}

impl<S: ScanStore> CountTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            last_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Last refreshed value; zero before the first refresh.
    pub async fn current(&self) -> u64 {
        *self.last_count.lock().await
    }

    /// Issue a fresh exact-count query and cache the result.
    pub async fn refresh(&self, owner: &OwnerId) -> Result<u64, StoreError> {
        let count = self.store.count(owner).await?;
        *self.last_count.lock().await = count;
        Ok(count)
    }

    /// Back to zero on session teardown.
    pub async fn reset(&self) {
        *self.last_count.lock().await = 0;
    }
}
