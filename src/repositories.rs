//! Session-scoped caches
//!
//! Process-wide state scoped to the active user session: the page/cursor
//! caches and the cached exact count. All of it is cleared in bulk on any
//! mutation and on sign-out/sign-in.

pub mod count;
pub mod pages;

pub use count::CountTracker;
pub use pages::HistoryCaches;
