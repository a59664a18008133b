//! Common utilities
//!
//! Shared helpers for the library's ambient concerns:
//! - Logging configuration
//! - Path management

pub mod logging;
pub mod paths;

// Re-export commonly used functions
pub use logging::initialize_logging;
pub use paths::{get_config_dir, get_data_dir, version};
