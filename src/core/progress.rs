//! Run context and progress reporting

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;

use super::config::{PROGRESS_CHARS, PROGRESS_TEMPLATE};
use super::stats::SyncStatistics;
use super::task::SyncTask;
use crate::git::Status;
use crate::utils::ShutdownSignal;

/// State shared by every stage of one run
///
/// Carries the run's root span instead of a process-wide logger: the
/// enumerator, scheduler and reconciler open their spans beneath it.
#[derive(Clone)]
pub struct SyncContext {
    pub span: tracing::Span,
    pub shutdown: ShutdownSignal,
    pub statistics: Arc<SyncStatistics>,
    pub progress: ProgressBar,
    pub start_time: Instant,
}

impl SyncContext {
    /// Context with a hidden progress bar
    pub fn new(span: tracing::Span, shutdown: ShutdownSignal) -> Self {
        Self {
            span,
            shutdown,
            statistics: Arc::new(SyncStatistics::new()),
            progress: ProgressBar::hidden(),
            start_time: Instant::now(),
        }
    }

    /// Shows a bar with one tick per finished repository
    pub fn with_progress_bar(mut self, total: usize, prefix: &str) -> Result<Self> {
        self.progress = create_progress_bar(total as u64, prefix)?;
        Ok(self)
    }

    /// Child span for one repository's work
    pub fn repository_span(&self, task: &SyncTask) -> tracing::Span {
        tracing::info_span!(
            parent: &self.span,
            "repo",
            project = %task.project(),
            repo = %task.slug()
        )
    }

    /// Records a task's terminal status in the statistics and progress bar
    pub fn record(&self, task: &SyncTask, status: Status, message: &str) {
        let name = task.display_name();
        let path = task.destination.display().to_string();
        self.statistics.update(&name, &path, &status, message);
        self.progress.set_message(format!("{} {name}", status.symbol()));
        self.progress.inc(1);
    }

    /// Clears the bar and returns the run summary
    pub fn finish(&self, total_repos: usize) -> String {
        self.progress.finish_and_clear();
        self.statistics
            .generate_summary(total_repos, self.start_time.elapsed())
    }
}

/// Creates the run-level progress bar
pub(crate) fn create_progress_bar(total: u64, prefix: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(create_progress_style()?);
    pb.set_prefix(prefix.to_string());
    Ok(pb)
}

/// Creates a progress bar style configuration
pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)?
        .progress_chars(PROGRESS_CHARS))
}
