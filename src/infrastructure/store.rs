//! Store traits consumed by the history core
//!
//! The remote wire protocols are not owned here; adapters translate their
//! provider's errors into [`StoreError`] so the core can tell benign
//! not-found conditions and transient failures apart.

use crate::domain::page::CursorToken;
use crate::domain::scan::{OwnerId, Scan, ScanId};

/// One forward-pagination batch.
#[derive(Debug, Clone)]
pub struct ScanBatch {
    /// Records in collection order (newest first).
    pub scans: Vec<Scan>,
    /// Continuation marker for the batch after this one. `None` means the
    /// end of the collection was reached within this batch.
    pub next_cursor: Option<CursorToken>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed document or object does not exist.
    #[error("not found")]
    NotFound,

    /// Transient transport or availability failure; retrying may succeed.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// Anything the adapter could not classify.
    #[error("backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// The document store holding the per-user scan collection.
///
/// Only forward cursor pagination and an independent exact count are
/// available; there is no random-offset seek.
#[allow(async_fn_in_trait)]
pub trait ScanStore {
    /// Fetch up to `page_size` scans after `after`, or from the head of the
    /// collection when `after` is `None`.
    async fn fetch_page(
        &self,
        owner: &OwnerId,
        page_size: u32,
        after: Option<&CursorToken>,
    ) -> Result<ScanBatch, StoreError>;

    /// Exact total for `owner`. Separately priced by the provider; never
    /// derived from cached pages.
    async fn count(&self, owner: &OwnerId) -> Result<u64, StoreError>;

    /// Write a new scan document, returning its assigned id.
    async fn create(&self, owner: &OwnerId, scan: Scan) -> Result<ScanId, StoreError>;

    /// Delete the scan document.
    async fn delete(&self, owner: &OwnerId, id: &ScanId) -> Result<(), StoreError>;
}

/// The object store holding the captured images.
#[allow(async_fn_in_trait)]
pub trait ImageStore {
    /// Resolve a display URL for an object path. `StoreError::NotFound` is
    /// the benign case the hydrator tolerates.
    async fn resolve_download_url(&self, storage_path: &str) -> Result<String, StoreError>;

    /// Delete the object. A missing object may be reported as `NotFound`;
    /// callers treat that as already deleted.
    async fn delete_object(&self, storage_path: &str) -> Result<(), StoreError>;
}
