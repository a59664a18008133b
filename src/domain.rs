//! Domain types for the scan history
//!
//! Value types only; no I/O. The store traits that produce and consume
//! these live in [`crate::infrastructure`].

pub mod page;
pub mod scan;

pub use page::{CursorToken, PageKey};
pub use scan::{AlternatePrediction, Analysis, OwnerId, Scan, ScanId};
