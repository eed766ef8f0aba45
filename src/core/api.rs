//! Public API for the core module.
//!
//! Everything the commands need to drive a run: configuration, the task
//! model, the staleness gate, the scheduler and run-level reporting.

// Run model
pub use super::progress::SyncContext;
pub use super::scheduler::{Scheduler, TaskOutcome, TaskReport};
pub use super::staleness::StalenessCache;
pub use super::stats::SyncStatistics;
pub use super::task::{working_copy_path, SyncTask};

// Discovery
pub use super::discovery::find_working_copies;

// Configuration
pub use super::config::{get_sync_concurrency, MirrorConfig, MirrorOptions};
pub use super::config::{DEFAULT_STALENESS_MINUTES, DEFAULT_SYNC_CONCURRENCY};

// User-facing messages
pub use super::config::{ENUMERATING_MESSAGE, NO_REPOS_MESSAGE};

// Terminal utilities (re-exported from utils)
pub use crate::utils::{set_terminal_title, set_terminal_title_and_flush};
