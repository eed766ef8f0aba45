// Internal modules - not part of public API
pub(crate) mod discovery;
pub(crate) mod progress;
pub(crate) mod stats;

pub mod config;
pub mod scheduler;
pub mod staleness;
pub mod task;


// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
