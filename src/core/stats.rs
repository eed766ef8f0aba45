//! Statistics tracking for mirror runs

use crate::core::config::{ERROR_MESSAGE_MAX_LENGTH, ERROR_MESSAGE_TRUNCATE_LENGTH, NAME_DISPLAY_WIDTH, PATH_DISPLAY_WIDTH};
use crate::git::Status;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Statistics for tracking repository sync results
///
/// Uses atomic counters for lock-free reads and writes of simple counters,
/// while the failure lists remain behind a Mutex.
#[derive(Debug, Default)]
pub struct SyncStatistics {
    // Atomic counters for lock-free access
    pub cloned_repos: AtomicU64,
    pub updated_repos: AtomicU64,
    pub fresh_repos: AtomicU64,
    pub partial_repos: AtomicU64,
    pub error_repos: AtomicU64,
    pub cancelled_repos: AtomicU64,
    pub branches_reset: AtomicU64,
    pub branches_created: AtomicU64,
    // Complex data behind mutex
    pub failed_repos: Mutex<Vec<(String, String, String)>>, // (repo_name, repo_path, error_message)
    pub partial_failures: Mutex<Vec<(String, String, String)>>, // (repo_name, repo_path, message)
}

impl SyncStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a task's terminal status
    pub fn update(&self, repo_name: &str, repo_path: &str, status: &Status, message: &str) {
        match status {
            Status::Cloned => {
                self.cloned_repos.fetch_add(1, Ordering::Relaxed);
            }
            Status::Updated => {
                self.updated_repos.fetch_add(1, Ordering::Relaxed);
            }
            Status::Fresh => {
                self.fresh_repos.fetch_add(1, Ordering::Relaxed);
            }
            Status::Cancelled => {
                self.cancelled_repos.fetch_add(1, Ordering::Relaxed);
            }
            Status::Partial => {
                self.partial_repos.fetch_add(1, Ordering::Relaxed);
                record(&self.partial_failures, repo_name, repo_path, message);
            }
            Status::Failed => {
                self.error_repos.fetch_add(1, Ordering::Relaxed);
                record(&self.failed_repos, repo_name, repo_path, message);
            }
        }
    }

    pub fn record_branches(&self, reset: usize, created: usize) {
        self.branches_reset.fetch_add(reset as u64, Ordering::Relaxed);
        self.branches_created.fetch_add(created as u64, Ordering::Relaxed);
    }

    /// Number of tasks that reached any terminal status
    pub fn completed(&self) -> u64 {
        [
            &self.cloned_repos,
            &self.updated_repos,
            &self.fresh_repos,
            &self.partial_repos,
            &self.error_repos,
            &self.cancelled_repos,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::Relaxed))
        .sum()
    }

    /// One-line run summary
    pub fn generate_summary(&self, total_repos: usize, duration: Duration) -> String {
        let duration_secs = duration.as_secs_f64();

        let cloned = self.cloned_repos.load(Ordering::Relaxed);
        let updated = self.updated_repos.load(Ordering::Relaxed);
        let fresh = self.fresh_repos.load(Ordering::Relaxed);
        let partial = self.partial_repos.load(Ordering::Relaxed);
        let errors = self.error_repos.load(Ordering::Relaxed);
        let cancelled = self.cancelled_repos.load(Ordering::Relaxed);

        let mut summary = format!(
            "✅ {total_repos} repos in {duration_secs:.1}s • {cloned} cloned • {updated} updated • {fresh} skipped"
        );
        if partial > 0 {
            summary.push_str(&format!(" • {partial} partial"));
        }
        if errors > 0 {
            summary.push_str(&format!(" • {errors} failed"));
        }
        if cancelled > 0 {
            summary.push_str(&format!(" • {cancelled} cancelled"));
        }
        summary
    }

    /// Tree-formatted list of repositories that need attention
    pub fn generate_detailed_summary(&self) -> String {
        let mut lines = Vec::new();

        if let Ok(failed) = self.failed_repos.lock() {
            push_section(&mut lines, "🔴 FAILED REPOS", &failed);
        }
        if let Ok(partial) = self.partial_failures.lock() {
            push_section(&mut lines, "🟡 PARTIAL SYNCS", &partial);
        }

        // Remove trailing blank line if it exists
        if lines.last() == Some(&String::new()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

fn record(list: &Mutex<Vec<(String, String, String)>>, repo_name: &str, repo_path: &str, message: &str) {
    match list.lock() {
        Ok(mut guard) => guard.push((
            repo_name.to_string(),
            repo_path.to_string(),
            clean_error_message(message),
        )),
        Err(_) => tracing::warn!(repo = repo_name, "failed to record repository outcome"),
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, entries: &[(String, String, String)]) {
    if entries.is_empty() {
        return;
    }
    lines.push(format!("{title} ({})", entries.len()));
    for (i, (repo_name, repo_path, message)) in entries.iter().enumerate() {
        let tree_char = if i == entries.len() - 1 { "└─" } else { "├─" };
        let short_path = crate::utils::shorten_path(repo_path, PATH_DISPLAY_WIDTH);
        lines.push(format!(
            "   {} {:name_width$} {:path_width$} # {}",
            tree_char,
            repo_name,
            short_path,
            message,
            name_width = NAME_DISPLAY_WIDTH,
            path_width = PATH_DISPLAY_WIDTH,
        ));
    }
    lines.push(String::new());
}

/// Cleans and formats error messages for display
pub(crate) fn clean_error_message(error: &str) -> String {
    // Collapse newlines, tabs and runs of whitespace
    let cleaned = error.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.contains("timed out") {
        "timeout".to_string()
    } else if cleaned.contains("Authentication failed") || cleaned.contains("Permission denied") {
        "authentication failed".to_string()
    } else if cleaned.contains("Could not resolve host") || cleaned.contains("unable to access") {
        "network error".to_string()
    } else if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_TRUNCATE_LENGTH).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}
