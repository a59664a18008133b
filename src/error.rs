//! Crate-boundary error type
//!
//! Soft failures (image-URL resolution) never reach this type; they are
//! logged and swallowed inside the hydrator. Everything here is surfaced to
//! the caller, who owns retries and user-facing messaging.

use crate::domain::scan::ScanId;
use crate::infrastructure::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// A fetch or mutation against the remote store failed. Caches are left
    /// in their last-known-good state; retrying is safe.
    #[error("store operation failed")]
    Store(#[from] StoreError),

    /// The image object was removed but the document delete failed, leaving
    /// an orphaned document. Retrying the delete for the same scan is safe:
    /// object deletion is idempotent and the document is the source of truth.
    #[error("scan {id} partially deleted: image object removed, document remains")]
    PartialDelete {
        id: ScanId,
        #[source]
        source: StoreError,
    },

    /// Zero page number or page size; a caller bug, rejected before any I/O.
    #[error("invalid page request: page {page_number} with size {page_size}")]
    InvalidPage { page_number: u32, page_size: u32 },

    /// A mutation was requested while no user session is active.
    #[error("no active session")]
    NoSession,
}

impl HistoryError {
    /// Whether retrying the same call can be expected to succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_transient(),
            Self::PartialDelete { .. } => true,
            Self::InvalidPage { .. } | Self::NoSession => false,
        }
    }
}
