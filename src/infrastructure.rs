//! Infrastructure seams
//!
//! The store traits the real document-store and object-store adapters
//! implement, the layered configuration, and in-memory doubles used by this
//! crate's tests and by downstream callers' tests.

pub mod config;
pub mod memory;
pub mod store;
