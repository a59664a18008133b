//! Page and cursor value types
//!
//! `PageKey` is the sole identity for cache lookups. `CursorToken` is the
//! store-issued continuation marker and stays opaque: it is only ever
//! obtained from a store response, cached, and handed back to the store.

use serde::{Deserialize, Serialize};

/// Composite cache key `(page_size, page_number)`, both 1-based.
///
/// Different page sizes form independent key families; changing the page
/// size never invalidates another family's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageKey {
    page_size: u32,
    page_number: u32,
}

impl PageKey {
    pub fn new(page_size: u32, page_number: u32) -> Self {
        debug_assert!(page_size >= 1 && page_number >= 1);
        Self {
            page_size,
            page_number,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }
}

/// Opaque continuation marker for "after item X".
///
/// The cursor cached under page `(s, n)` is only valid as the starting
/// cursor for fetching page `(s, n + 1)`, and only until the collection is
/// mutated. Equality and ordering are deliberately not exposed.
#[derive(Clone)]
pub struct CursorToken(String);

impl CursorToken {
    /// Wrap a store-issued marker. Only store adapters should call this.
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    /// Raw marker for handing back to the store adapter.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CursorToken {
    // Markers can embed document ids; keep them out of logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CursorToken(..)")
    }
}
