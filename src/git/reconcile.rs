//! Branch reconciliation: converge a working copy onto its remote branch set
//!
//! Per working copy: `Absent -> Cloned -> Fetched -> Reconciled`, with `Failed`
//! reachable from any transition whose command fails. Branches are processed
//! strictly one after another because checkouts mutate the single working tree.

use std::path::Path;

use super::branches::{parse_remote_branches, remote_ref, DEFAULT_REMOTE, GIT_BRANCH_ALL_ARGS};
use super::executor::{CommandError, CommandExecutor, CommandOutcome};
use super::status::Status;
use crate::core::SyncTask;

const GIT_METADATA_DIR: &str = ".git";

// Git command arguments
const GIT_FETCH_PRUNE_ARGS: &[&str] = &["fetch", "--prune", "--quiet"];

/// Lifecycle of one working copy during a sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingCopyState {
    Absent,
    Cloned,
    Fetched,
    Reconciled,
    Failed,
}

/// A branch whose convergence step failed; the rest of the pass continued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFailure {
    pub branch: String,
    pub error: String,
}

/// What one sync pass did to a working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub state: WorkingCopyState,
    pub cloned: bool,
    /// Existing local branches force-checked-out and hard-reset
    pub reset_branches: Vec<String>,
    /// New local tracking branches
    pub created_branches: Vec<String>,
    pub branch_failures: Vec<BranchFailure>,
    /// Set when the pass ended in `Failed`
    pub error: Option<String>,
}

impl ReconcileReport {
    fn new(state: WorkingCopyState) -> Self {
        Self {
            state,
            cloned: false,
            reset_branches: Vec::new(),
            created_branches: Vec::new(),
            branch_failures: Vec::new(),
            error: None,
        }
    }

    fn fail(mut self, error: impl Into<String>) -> Self {
        self.state = WorkingCopyState::Failed;
        self.error = Some(error.into());
        self
    }

    pub fn status(&self) -> Status {
        match self.state {
            WorkingCopyState::Failed => Status::Failed,
            _ if !self.branch_failures.is_empty() => Status::Partial,
            _ if self.cloned => Status::Cloned,
            _ => Status::Updated,
        }
    }

    /// Short human summary for progress output
    pub fn message(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }
        let mut message = format!(
            "{} reset, {} created",
            self.reset_branches.len(),
            self.created_branches.len()
        );
        if !self.branch_failures.is_empty() {
            message.push_str(&format!(", {} failed", self.branch_failures.len()));
        }
        message
    }
}

/// True when `path` exists and holds version-control metadata
pub fn is_working_copy(path: &Path) -> bool {
    path.join(GIT_METADATA_DIR).exists()
}

/// Drives clone, prune-fetch and per-branch convergence through a `CommandExecutor`
pub struct BranchReconciler<E> {
    executor: E,
    remote: String,
}

impl<E: CommandExecutor> BranchReconciler<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Clones the task's repository if needed, then reconciles every branch
    pub async fn sync(&self, task: &SyncTask) -> ReconcileReport {
        let path = task.destination.as_path();
        if is_working_copy(path) {
            return self.reconcile(path).await;
        }

        tracing::debug!(path = %path.display(), "working copy absent");
        let report = ReconcileReport::new(WorkingCopyState::Absent);
        if !task.clone_if_missing {
            return report.fail("working copy missing");
        }

        if let Err(e) = self.clone_into(&task.descriptor.clone_url, path).await {
            tracing::error!(path = %path.display(), error = %e, "clone failed");
            return report.fail(format!("clone failed: {e}"));
        }
        tracing::info!(path = %path.display(), "cloned");

        let mut report = self.reconcile(path).await;
        report.cloned = true;
        report
    }

    /// Prune-fetches and converges the local branches of an existing working copy
    pub async fn reconcile(&self, path: &Path) -> ReconcileReport {
        let report = ReconcileReport::new(WorkingCopyState::Cloned);

        if let Err(e) = self.run(path, GIT_FETCH_PRUNE_ARGS).await.into_result() {
            tracing::error!(path = %path.display(), error = %e, "fetch failed");
            return report.fail(format!("fetch failed: {e}"));
        }
        let mut report = ReconcileReport {
            state: WorkingCopyState::Fetched,
            ..report
        };

        let branches = match self.remote_branches(path).await {
            Ok(branches) => branches,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "listing remote branches failed");
                return report.fail(format!("branch listing failed: {e}"));
            }
        };
        tracing::debug!(path = %path.display(), count = branches.len(), "remote branches");

        for branch in branches {
            match self.converge_branch(path, &branch).await {
                Ok(BranchAction::Reset) => report.reset_branches.push(branch),
                Ok(BranchAction::Created) => report.created_branches.push(branch),
                Err(e) => {
                    tracing::warn!(path = %path.display(), branch = %branch, error = %e, "branch reconciliation failed");
                    report.branch_failures.push(BranchFailure {
                        branch,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.state = WorkingCopyState::Reconciled;
        report
    }

    /// Bare names of every remote-tracking branch, in listing order
    pub async fn remote_branches(&self, path: &Path) -> Result<Vec<String>, CommandError> {
        let listing = self.run(path, GIT_BRANCH_ALL_ARGS).await.into_result()?;
        Ok(parse_remote_branches(&listing, &self.remote))
    }

    /// Distinguishes "no such local branch" from a command that could not run
    pub async fn local_branch_exists(&self, path: &Path, branch: &str) -> Result<bool, CommandError> {
        let local_ref = format!("refs/heads/{branch}");
        match self
            .run(path, &["rev-parse", "--verify", "--quiet", &local_ref])
            .await
        {
            CommandOutcome::Output(_) => Ok(true),
            CommandOutcome::NoOutput => Ok(false),
            CommandOutcome::Failed(e) if e.is_exit() => Ok(false),
            CommandOutcome::Failed(e) => Err(e),
        }
    }

    async fn converge_branch(&self, path: &Path, branch: &str) -> Result<BranchAction, CommandError> {
        let tracking_ref = format!("refs/remotes/{}", remote_ref(&self.remote, branch));

        if self.local_branch_exists(path, branch).await? {
            tracing::debug!(branch, "force checkout");
            // A failed checkout skips the reset: resetting would move whatever branch is checked out
            self.run(path, &["checkout", "--force", "--quiet", branch, "--"])
                .await
                .into_result()?;
            tracing::debug!(branch, "hard reset to {}", remote_ref(&self.remote, branch));
            self.run(path, &["reset", "--hard", "--quiet", &tracking_ref])
                .await
                .into_result()?;
            Ok(BranchAction::Reset)
        } else {
            tracing::debug!(branch, "create tracking branch");
            self.run(path, &["branch", "--quiet", "--track", branch, &tracking_ref])
                .await
                .into_result()?;
            Ok(BranchAction::Created)
        }
    }

    async fn clone_into(&self, clone_url: &str, path: &Path) -> Result<(), CommandError> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        if let Err(source) = tokio::fs::create_dir_all(parent).await {
            return Err(CommandError::Spawn {
                command: format!("mkdir -p {}", parent.display()),
                source,
            });
        }
        // Relative to `parent`, which is also the command's working directory
        let target = match path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => path.to_string_lossy(),
        };
        self.run(parent, &["clone", "--quiet", clone_url, &target])
            .await
            .into_result()
            .map(|_| ())
    }

    async fn run(&self, path: &Path, args: &[&str]) -> CommandOutcome {
        self.executor.run(args, path).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchAction {
    Reset,
    Created,
}
