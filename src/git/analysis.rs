//! Read-only inspection of a mirrored working copy

use std::path::Path;

use super::branches::{parse_remote_branches, DEFAULT_REMOTE, GIT_BRANCH_ALL_ARGS};
use super::executor::{CommandError, CommandExecutor, CommandOutcome};

const GIT_COMMIT_COUNT_ARGS: &[&str] = &["rev-list", "--count", "HEAD"];

/// Remote branches and history size of one working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopyAnalysis {
    pub remote_branches: Vec<String>,
    /// Commits reachable from the checked-out branch
    pub commit_count: u64,
}

/// Lists remote branches and counts commits without changing the working copy
///
/// A repository without any commit (unborn `HEAD`) reports zero commits.
pub async fn analyze_working_copy<E: CommandExecutor>(
    executor: &E,
    path: &Path,
) -> Result<WorkingCopyAnalysis, CommandError> {
    let listing = executor.run(GIT_BRANCH_ALL_ARGS, path).await.into_result()?;
    let remote_branches = parse_remote_branches(&listing, DEFAULT_REMOTE);

    let commit_count = match executor.run(GIT_COMMIT_COUNT_ARGS, path).await {
        CommandOutcome::Output(count) => count.trim().parse().unwrap_or(0),
        CommandOutcome::NoOutput => 0,
        CommandOutcome::Failed(e) if e.is_exit() => 0,
        CommandOutcome::Failed(e) => return Err(e),
    };

    Ok(WorkingCopyAnalysis {
        remote_branches,
        commit_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Answers `branch --all` and `rev-list` with fixed outcomes
    struct FixedExecutor {
        listing: &'static str,
        count: Result<&'static str, Option<i32>>,
    }

    #[async_trait]
    impl CommandExecutor for FixedExecutor {
        async fn run(&self, args: &[&str], _cwd: &Path) -> CommandOutcome {
            let command = args.join(" ");
            if args.first() == Some(&"branch") {
                return CommandOutcome::Output(self.listing.to_string());
            }
            match self.count {
                Ok(count) => CommandOutcome::Output(count.to_string()),
                Err(code) => CommandOutcome::Failed(CommandError::Exit {
                    command,
                    code,
                    stderr: "fatal: ambiguous argument 'HEAD'".to_string(),
                }),
            }
        }
    }

    const LISTING: &str = "* main\n  remotes/origin/HEAD -> origin/main\n  remotes/origin/main\n  remotes/origin/feature/x\n";

    #[tokio::test]
    async fn test_branches_and_commit_count() {
        let executor = FixedExecutor {
            listing: LISTING,
            count: Ok("42"),
        };
        let analysis = analyze_working_copy(&executor, Path::new("/m/P/repo")).await.unwrap();
        assert_eq!(analysis.remote_branches, vec!["main", "feature/x"]);
        assert_eq!(analysis.commit_count, 42);
    }

    #[tokio::test]
    async fn test_unborn_head_counts_zero_commits() {
        let executor = FixedExecutor {
            listing: "",
            count: Err(Some(128)),
        };
        let analysis = analyze_working_copy(&executor, Path::new("/m/P/empty")).await.unwrap();
        assert!(analysis.remote_branches.is_empty());
        assert_eq!(analysis.commit_count, 0);
    }

    #[tokio::test]
    async fn test_unrunnable_git_is_an_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let executor = crate::git::GitExecutor::default().with_program("/nonexistent/git-binary");
        let err = analyze_working_copy(&executor, temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
