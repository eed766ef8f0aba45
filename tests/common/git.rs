//! Git testing utilities

use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Runs `git <args>` in `path`, returning trimmed stdout
pub fn git(path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(path).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sets up a git repository on branch `main` with user config
pub fn setup_git_repo(path: &Path) -> Result<()> {
    git(path, &["init", "--quiet"])?;
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    configure_user(path)
}

/// Local identity so commits work in sandboxes without global config
pub fn configure_user(path: &Path) -> Result<()> {
    git(path, &["config", "user.name", "Test User"])?;
    git(path, &["config", "user.email", "test@example.com"])?;
    // Disable commit signing for tests
    git(path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Creates a test commit in the repository
pub fn create_test_commit(path: &Path, file_name: &str, content: &str, message: &str) -> Result<()> {
    std::fs::write(path.join(file_name), content)?;
    git(path, &["add", file_name])?;
    git(path, &["commit", "--quiet", "-m", message])?;
    Ok(())
}

/// Commit id a revision resolves to
pub fn rev_parse(path: &Path, rev: &str) -> Result<String> {
    git(path, &["rev-parse", rev])
}

/// True when `refs/...` resolves in the repository
pub fn ref_exists(path: &Path, full_ref: &str) -> bool {
    git(path, &["rev-parse", "--verify", "--quiet", full_ref]).is_ok()
}

/// Local branch names, sorted
pub fn local_branches(path: &Path) -> Result<Vec<String>> {
    let listing = git(path, &["for-each-ref", "--format=%(refname:short)", "refs/heads"])?;
    let mut branches: Vec<String> = listing.lines().map(str::to_string).collect();
    branches.sort();
    Ok(branches)
}

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
