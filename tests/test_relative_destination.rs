//! Mirroring into a destination given relative to the current directory
//!
//! Kept in its own test binary because it changes the process working directory.

mod common;

use common::{is_git_available, MirrorSandbox};
use goobits_mirror::core::SyncTask;
use goobits_mirror::git::{is_working_copy, BranchReconciler, GitExecutor, Status, WorkingCopyState};
use goobits_mirror::provider::RepositoryDescriptor;
use std::path::Path;

#[tokio::test]
async fn test_relative_destination_clones_into_expected_path() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }
    let sandbox = MirrorSandbox::new(&["feature-a"]).unwrap();
    std::env::set_current_dir(sandbox.temp_dir.path()).unwrap();

    let descriptor = RepositoryDescriptor::new("Upstream Repo", sandbox.upstream.url(), "PROJ");
    let task = SyncTask::new(descriptor, Path::new("mirror"));
    let reconciler = BranchReconciler::new(GitExecutor::default());

    let report = reconciler.sync(&task).await;

    assert_eq!(report.state, WorkingCopyState::Reconciled, "{report:?}");
    assert_eq!(report.status(), Status::Cloned);
    let expected = sandbox.destination().join("PROJ/upstream-repo");
    assert!(is_working_copy(&expected));
    assert!(!sandbox.destination().join("PROJ/mirror").exists());

    // A second run finds the copy where the first one put it
    let second = reconciler.sync(&task).await;
    assert_eq!(second.status(), Status::Updated, "{second:?}");
}
