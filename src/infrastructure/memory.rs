//! In-memory store doubles
//!
//! Deterministic implementations of [`ScanStore`] and [`ImageStore`] with
//! call counters and failure injection. They back this crate's unit and
//! integration tests and are exported so downstream callers can test
//! against the same semantics without a live backend.
//!
//! Cursor semantics mirror a `startAfter` walk: a cursor names the last
//! document of the batch it came from, and the next batch starts at the
//! position *currently* after that document. A mutation therefore shifts
//! what an old cursor points at, exactly like the real store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use crate::domain::page::CursorToken;
use crate::domain::scan::{Analysis, OwnerId, Scan, ScanId};
use crate::infrastructure::store::{ImageStore, ScanBatch, ScanStore, StoreError};

#[derive(Default)]
struct ScanStoreInner {
    collections: HashMap<OwnerId, Vec<Scan>>,
    fetch_calls: u64,
    count_calls: u64,
    fail_next_fetch: bool,
    fail_next_count: bool,
    fail_next_delete: bool,
    fail_next_create: bool,
}

/// In-memory [`ScanStore`] keeping one newest-first collection per owner.
#[derive(Clone, Default)]
pub struct MemoryScanStore {
    inner: Arc<Mutex<ScanStoreInner>>,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `owner`'s collection. Scans are kept newest-first regardless
    /// of the order given.
    pub async fn seed(&self, owner: &OwnerId, scans: impl IntoIterator<Item = Scan>) {
        let mut scans: Vec<Scan> = scans.into_iter().collect();
        scans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut inner = self.inner.lock().await;
        inner.collections.insert(owner.clone(), scans);
    }

    /// Number of `fetch_page` calls made so far.
    pub async fn fetch_calls(&self) -> u64 {
        self.inner.lock().await.fetch_calls
    }

    pub async fn count_calls(&self) -> u64 {
        self.inner.lock().await.count_calls
    }

    /// Make the next `fetch_page` fail with a transient error.
    pub async fn fail_next_fetch(&self) {
        self.inner.lock().await.fail_next_fetch = true;
    }

    pub async fn fail_next_count(&self) {
        self.inner.lock().await.fail_next_count = true;
    }

    pub async fn fail_next_delete(&self) {
        self.inner.lock().await.fail_next_delete = true;
    }

    pub async fn fail_next_create(&self) {
        self.inner.lock().await.fail_next_create = true;
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable {
            message: String::from("injected failure"),
        }
    }
}

impl ScanStore for MemoryScanStore {
    async fn fetch_page(
        &self,
        owner: &OwnerId,
        page_size: u32,
        after: Option<&CursorToken>,
    ) -> Result<ScanBatch, StoreError> {
        // Model the I/O suspension point of a real transport.
        tokio::task::yield_now().await;

        let mut inner = self.inner.lock().await;
        inner.fetch_calls += 1;
        if inner.fail_next_fetch {
            inner.fail_next_fetch = false;
            return Err(Self::unavailable());
        }

        let collection = inner.collections.get(owner).map(Vec::as_slice).unwrap_or(&[]);
        let start = match after {
            None => 0,
            Some(cursor) => {
                let anchor = collection
                    .iter()
                    .position(|scan| scan.id.as_str() == cursor.as_str())
                    .ok_or(StoreError::NotFound)?;
                anchor + 1
            }
        };

        let end = (start + page_size as usize).min(collection.len());
        let scans: Vec<Scan> = collection[start..end].to_vec();
        let next_cursor = if end < collection.len() {
            scans.last().map(|scan| CursorToken::new(scan.id.as_str()))
        } else {
            None
        };

        Ok(ScanBatch { scans, next_cursor })
    }

    async fn count(&self, owner: &OwnerId) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.count_calls += 1;
        if inner.fail_next_count {
            inner.fail_next_count = false;
            return Err(Self::unavailable());
        }
        Ok(inner.collections.get(owner).map_or(0, |c| c.len() as u64))
    }

    async fn create(&self, owner: &OwnerId, scan: Scan) -> Result<ScanId, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_next_create {
            inner.fail_next_create = false;
            return Err(Self::unavailable());
        }
        let id = scan.id.clone();
        let collection = inner.collections.entry(owner.clone()).or_default();
        collection.insert(0, scan);
        collection.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(id)
    }

    async fn delete(&self, owner: &OwnerId, id: &ScanId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_next_delete {
            inner.fail_next_delete = false;
            return Err(Self::unavailable());
        }
        let collection = inner
            .collections
            .get_mut(owner)
            .ok_or(StoreError::NotFound)?;
        let before = collection.len();
        collection.retain(|scan| &scan.id != id);
        if collection.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
struct ImageStoreInner {
    objects: HashMap<String, String>,
    deleted: Vec<String>,
    resolve_calls: u64,
    failing_paths: HashSet<String>,
}

/// In-memory [`ImageStore`] mapping object paths to display URLs.
#[derive(Clone, Default)]
pub struct MemoryImageStore {
    inner: Arc<Mutex<ImageStoreInner>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_object(&self, storage_path: impl Into<String>, url: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.objects.insert(storage_path.into(), url.into());
    }

    /// Make every resolution of `storage_path` fail with a transient error
    /// instead of the benign `NotFound`.
    pub async fn fail_path(&self, storage_path: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.failing_paths.insert(storage_path.into());
    }

    pub async fn resolve_calls(&self) -> u64 {
        self.inner.lock().await.resolve_calls
    }

    /// Paths removed via `delete_object`, in call order.
    pub async fn deleted_paths(&self) -> Vec<String> {
        self.inner.lock().await.deleted.clone()
    }
}

impl ImageStore for MemoryImageStore {
    async fn resolve_download_url(&self, storage_path: &str) -> Result<String, StoreError> {
        tokio::task::yield_now().await;

        let mut inner = self.inner.lock().await;
        inner.resolve_calls += 1;
        if inner.failing_paths.contains(storage_path) {
            return Err(StoreError::Unavailable {
                message: String::from("injected failure"),
            });
        }
        inner
            .objects
            .get(storage_path)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete_object(&self, storage_path: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.deleted.push(storage_path.to_string());
        match inner.objects.remove(storage_path) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

/// A deterministic scan for seeding the memory store. Higher `n` means a
/// newer scan, so `(1..=12).map(sample_scan)` seeds scan-12 at the head.
pub fn sample_scan(n: u32) -> Scan {
    let at = Utc
        .timestamp_opt(1_700_000_000 + i64::from(n) * 60, 0)
        .single()
        .expect("valid timestamp");
    Scan {
        id: ScanId::new(format!("scan-{n}")),
        captured_at: at,
        created_at: at,
        updated_at: at,
        storage_path: Some(format!("scans/demo/scan-{n}.jpg")),
        image_url: None,
        analysis: Analysis {
            disease: String::from("Eczema"),
            confidence: 0.9,
            ..Analysis::default()
        },
    }
}
