//! Version-control command execution
//!
//! Every invocation first clears stale `*.lock` files left in the working
//! copy's `.git` directory by an interrupted run, then executes with a timeout.

use async_trait::async_trait;
use ignore::WalkBuilder;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

// Timeout constants
pub const GIT_OPERATION_TIMEOUT_SECS: u64 = 180; // 3 minutes per command

const GIT_METADATA_DIR: &str = ".git";
const GIT_REFS_DIR: &str = "refs";
const LOCK_EXTENSION: &str = "lock";

/// Why a command did not complete successfully
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The process ran and exited unsuccessfully
    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    /// The process exceeded the configured timeout
    #[error("`{command}` timed out after {secs} seconds")]
    Timeout { command: String, secs: u64 },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

impl CommandError {
    /// True when the command ran to completion and reported failure
    pub fn is_exit(&self) -> bool {
        matches!(self, CommandError::Exit { .. })
    }
}

/// Three-way result of one command invocation
#[derive(Debug)]
pub enum CommandOutcome {
    /// Ran successfully and printed something on stdout (trimmed)
    Output(String),
    /// Ran successfully with empty stdout
    NoOutput,
    /// Failed to run, ran unsuccessfully, or timed out
    Failed(CommandError),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, CommandOutcome::Failed(_))
    }

    /// Converts into a `Result`, folding `NoOutput` into an empty string
    pub fn into_result(self) -> Result<String, CommandError> {
        match self {
            CommandOutcome::Output(out) => Ok(out),
            CommandOutcome::NoOutput => Ok(String::new()),
            CommandOutcome::Failed(err) => Err(err),
        }
    }
}

/// Runs version-control commands against a working directory
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs `git <args>` inside `cwd`
    async fn run(&self, args: &[&str], cwd: &Path) -> CommandOutcome;
}

/// `git` binary executor backed by `tokio::process`
#[derive(Debug, Clone)]
pub struct GitExecutor {
    program: String,
    timeout: Duration,
}

impl Default for GitExecutor {
    fn default() -> Self {
        Self::new(Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS))
    }
}

impl GitExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "git".to_string(),
            timeout,
        }
    }

    /// Uses a different binary than `git` (tests point this at a missing program)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut command = self.program.clone();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        command
    }
}

#[async_trait]
impl CommandExecutor for GitExecutor {
    async fn run(&self, args: &[&str], cwd: &Path) -> CommandOutcome {
        let removed = clear_stale_locks(cwd);
        if removed > 0 {
            tracing::debug!(path = %cwd.display(), removed, "cleared stale lock files");
        }

        let command = self.describe(args);
        tracing::trace!(path = %cwd.display(), %command, "running");

        let mut child = Command::new(&self.program);
        child.args(args).current_dir(cwd).kill_on_drop(true);
        // Own process group: a terminal Ctrl+C interrupts the mirror, not the command it is waiting on
        #[cfg(unix)]
        child.process_group(0);

        let result = tokio::time::timeout(self.timeout, child.output()).await;

        match result {
            Ok(Ok(output)) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if stdout.is_empty() {
                    CommandOutcome::NoOutput
                } else {
                    CommandOutcome::Output(stdout)
                }
            }
            Ok(Ok(output)) => CommandOutcome::Failed(CommandError::Exit {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Ok(Err(source)) => CommandOutcome::Failed(CommandError::Spawn { command, source }),
            Err(_) => CommandOutcome::Failed(CommandError::Timeout {
                command,
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Deletes stale `*.lock` files in `<working_copy>/.git` and below `.git/refs`
///
/// Those are the places git leaves lock files (`index.lock`, `HEAD.lock`,
/// `packed-refs.lock`, `refs/heads/<branch>.lock`); the object store is not walked.
/// Returns the number of files removed; a missing `.git` is not an error
pub fn clear_stale_locks(working_copy: &Path) -> usize {
    let git_dir = working_copy.join(GIT_METADATA_DIR);
    if !git_dir.is_dir() {
        return 0;
    }

    remove_locks(&git_dir, Some(1)) + remove_locks(&git_dir.join(GIT_REFS_DIR), None)
}

fn remove_locks(dir: &Path, max_depth: Option<usize>) -> usize {
    if !dir.is_dir() {
        return 0;
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(max_depth)
        .build();

    let mut removed = 0;
    for entry in walker.flatten() {
        let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
        let is_lock = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == LOCK_EXTENSION);
        if is_file && is_lock {
            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(lock = %entry.path().display(), error = %e, "failed to remove stale lock");
                }
            }
        }
    }
    removed
}
