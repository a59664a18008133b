//! # Dermascan History - scan history page cache
//!
//! The session-scoped history core of a skin-scan client application. The
//! remote document store only supports forward cursor pagination (given the
//! last item of page K, fetch the next N items), while the UI exposes a
//! randomly-navigable, page-numbered list. This crate reconciles the two
//! with an in-memory page cache and a chained cursor cache, and keeps both
//! coherent across uploads, deletions, and session changes.
//!
//! ## Architecture Overview
//!
//! - **Domain** (`domain`): `Scan` records and the page/cursor value types
//! - **Infrastructure** (`infrastructure`): store traits implemented by the
//!   real document/object store adapters, plus in-memory doubles for tests
//! - **Repositories** (`repositories`): the page/cursor caches and the
//!   cached exact-count scalar
//! - **Orchestration** (`navigator`, `hydrator`, `mutation`): the cursor
//!   walk, per-page image-URL resolution, and mutation coordination
//! - **Facade** (`history`): [`ScanHistory`], the only type the rest of the
//!   application talks to
//!
//! ## Example Usage
//!
//! ```rust
//! use dermascan_history::infrastructure::memory::{sample_scan, MemoryImageStore, MemoryScanStore};
//! use dermascan_history::{OwnerId, ScanHistory};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dermascan_history::Result<()> {
//! let owner = OwnerId::new("user-1");
//! let scans = MemoryScanStore::new();
//! scans.seed(&owner, (1..=12).map(sample_scan)).await;
//!
//! let history = ScanHistory::new(scans, MemoryImageStore::new(), 5);
//! history.sign_in(owner).await;
//!
//! let page = history.page(3, 5).await?;
//! assert_eq!(page.len(), 2); // 12 scans, 5 per page
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Guarantees
//!
//! - **At-most-one walk per key**: repeat navigation to a cached page never
//!   touches the network; concurrent misses collapse to one in-flight walk
//! - **Invalidate-all on mutation**: any upload or deletion clears every
//!   cached page and cursor, then refetches page 1 before returning
//! - **Soft image resolution**: a missing thumbnail never fails a page
//! - **Session isolation**: a fetch that outlives a sign-out can never
//!   populate the next session's caches

#![deny(warnings)]
#![allow(dead_code)]

pub mod domain;
pub mod error;
pub mod history;
pub mod hydrator;
pub mod infrastructure;
pub mod mutation;
pub mod navigator;
pub mod repositories;
pub mod utils;

// Re-exports for convenience
pub use domain::page::{CursorToken, PageKey};
pub use domain::scan::{AlternatePrediction, Analysis, OwnerId, Scan, ScanId};
pub use error::HistoryError;
pub use history::ScanHistory;
pub use infrastructure::config::Config;
pub use infrastructure::store::{ImageStore, ScanBatch, ScanStore, StoreError};

/// Result type used throughout the library
pub type Result<T, E = HistoryError> = std::result::Result<T, E>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
