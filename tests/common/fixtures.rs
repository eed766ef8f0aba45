//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use goobits_mirror::core::SyncTask;
use goobits_mirror::provider::RepositoryDescriptor;

use super::git::{create_test_commit, git, rev_parse, setup_git_repo};

/// An upstream repository that clones are made from
pub struct UpstreamRepo {
    path: PathBuf,
}

impl UpstreamRepo {
    /// Creates `main` plus one branch per name, each with its own commit
    pub fn create(path: &Path, branches: &[&str]) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        setup_git_repo(path)?;
        create_test_commit(path, "README.md", "# upstream\n", "Initial commit")?;

        let upstream = Self {
            path: path.to_path_buf(),
        };
        for branch in branches {
            git(path, &["checkout", "--quiet", "-b", branch, "main"])?;
            upstream.commit(&format!("{branch}.txt"), branch)?;
        }
        git(path, &["checkout", "--quiet", "main"])?;
        Ok(upstream)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    /// Adds a commit on the checked-out branch
    pub fn commit(&self, file_name: &str, message: &str) -> Result<()> {
        create_test_commit(&self.path, file_name, message, message)
    }

    /// Adds a commit on `branch` and returns to `main`
    pub fn commit_on(&self, branch: &str, file_name: &str) -> Result<()> {
        git(&self.path, &["checkout", "--quiet", branch])?;
        self.commit(file_name, &format!("update {file_name}"))?;
        git(&self.path, &["checkout", "--quiet", "main"])?;
        Ok(())
    }

    pub fn create_branch(&self, branch: &str) -> Result<()> {
        git(&self.path, &["checkout", "--quiet", "-b", branch, "main"])?;
        self.commit(&format!("{branch}.txt"), branch)?;
        git(&self.path, &["checkout", "--quiet", "main"])?;
        Ok(())
    }

    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        git(&self.path, &["branch", "--quiet", "-D", branch])?;
        Ok(())
    }

    pub fn tip(&self, branch: &str) -> Result<String> {
        rev_parse(&self.path, branch)
    }
}

/// A temp directory holding an upstream repository and a mirror destination
pub struct MirrorSandbox {
    pub temp_dir: TempDir,
    pub upstream: UpstreamRepo,
}

impl MirrorSandbox {
    pub fn new(branches: &[&str]) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let upstream = UpstreamRepo::create(&temp_dir.path().join("upstream"), branches)?;
        std::fs::create_dir_all(temp_dir.path().join("mirror"))?;
        Ok(Self { temp_dir, upstream })
    }

    pub fn destination(&self) -> PathBuf {
        self.temp_dir.path().join("mirror")
    }

    /// Task mirroring the upstream as `PROJ/<slug of name>`
    pub fn task(&self, name: &str) -> SyncTask {
        let descriptor = RepositoryDescriptor::new(name, self.upstream.url(), "PROJ");
        SyncTask::new(descriptor, &self.destination())
    }
}
