//! # goobits-mirror
//!
//! `goobits-mirror` mirrors every branch of every repository owned by a GitHub
//! user/organization or a Bitbucket Server project onto local disk, and forces
//! each local branch back onto its remote counterpart on every run. It powers
//! the `mirror` CLI tool.
//!
//! ## Core Features
//!
//! - **Enumeration**: Paginated repository discovery with rate-limit awareness.
//! - **Staleness Gate**: Per-repository marker files skip recently synced copies.
//! - **Concurrent Sync**: Bounded worker pool, one task per repository.
//! - **Branch Reconciliation**: Prune-fetch, then force every known local branch
//!   onto `origin/<branch>` and create tracking branches for new ones.
//!
//! ## Example
//!
//! ```rust,no_run
//! use goobits_mirror::git::{BranchReconciler, GitExecutor};
//! use goobits_mirror::core::SyncTask;
//! use goobits_mirror::provider::RepositoryDescriptor;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let reconciler = BranchReconciler::new(GitExecutor::default());
//!     let descriptor = RepositoryDescriptor::new(
//!         "My Repo",
//!         "https://github.com/acme/my-repo.git",
//!         "acme",
//!     );
//!     let task = SyncTask::new(descriptor, Path::new("/srv/mirror"));
//!     let report = reconciler.sync(&task).await;
//!     println!("{}: {:?}", task.display_name(), report.state);
//! }
//! ```

pub mod commands;
pub mod core;
pub mod error;
pub mod git;
pub mod provider;
pub mod utils;
