//! Analyze-all command: branch and history overview of mirrored working copies

use anyhow::Result;
use futures::future;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::Path;
use std::time::SystemTime;
use tracing::Instrument;

use super::sync::select_existing;
use super::OutputFormat;
use crate::core::staleness::marker_age_minutes;
use crate::core::{find_working_copies, MirrorConfig, SyncContext, SyncTask, NO_REPOS_MESSAGE};
use crate::git::{analyze_working_copy, CommandExecutor, GitExecutor};
use crate::utils::relative_display;

const GIT_METADATA_DIR: &str = ".git";

/// One analyzed working copy; `error` is set when git could not inspect it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRow {
    pub project: String,
    pub repository: String,
    pub path: String,
    pub remote_branches: Vec<String>,
    pub commit_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handles the analyze-all action. Never contacts the hosting service.
pub async fn handle_analyze(config: &MirrorConfig, context: SyncContext) -> Result<()> {
    let root = config.destination.clone();
    let discovered = tokio::task::spawn_blocking(move || find_working_copies(root)).await?;
    let mut tasks = select_existing(discovered, config.project.as_deref(), config.name_filter.as_deref());

    if let Some(minutes) = config.activity_window_minutes {
        let now = SystemTime::now();
        tasks.retain(|task| recently_active(&task.destination, minutes, now));
    }
    tracing::info!(parent: &context.span, count = tasks.len(), "working copies to analyze");

    if tasks.is_empty() {
        println!("{NO_REPOS_MESSAGE}");
        return Ok(());
    }

    let executor = GitExecutor::new(config.command_timeout);
    let rows = analyze_all(&executor, tasks, config.concurrency, &context).await;
    println!("{}", render_analysis(&rows, &config.destination, config.format)?);
    Ok(())
}

/// True when the copy's `.git` changed within the last `minutes`
///
/// A timestamp in the future counts as recent.
pub fn recently_active(working_copy: &Path, minutes: u64, now: SystemTime) -> bool {
    let git_dir = working_copy.join(GIT_METADATA_DIR);
    match marker_age_minutes(&git_dir, now) {
        Ok(Some(age)) => age <= minutes,
        Ok(None) => git_dir.exists(),
        Err(e) => {
            tracing::debug!(path = %git_dir.display(), error = %e, "cannot read modification time");
            false
        }
    }
}

/// Analyzes up to `concurrency` copies at a time, keeping input order
///
/// Once shutdown is requested no further copy is started.
pub async fn analyze_all<E: CommandExecutor>(
    executor: &E,
    tasks: Vec<SyncTask>,
    concurrency: usize,
    context: &SyncContext,
) -> Vec<AnalysisRow> {
    let shutdown = context.shutdown.clone();
    stream::iter(tasks)
        .take_while(move |_| future::ready(!shutdown.is_requested()))
        .map(|task| {
            let span = context.repository_span(&task);
            analyze_task(executor, task).instrument(span)
        })
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
}

async fn analyze_task<E: CommandExecutor>(executor: &E, task: SyncTask) -> AnalysisRow {
    let mut row = AnalysisRow {
        project: task.project().to_string(),
        repository: task.descriptor.name.clone(),
        path: task.destination.display().to_string(),
        remote_branches: Vec::new(),
        commit_count: 0,
        error: None,
    };

    match analyze_working_copy(executor, &task.destination).await {
        Ok(analysis) => {
            tracing::debug!(
                branches = analysis.remote_branches.len(),
                commits = analysis.commit_count,
                "analyzed"
            );
            row.remote_branches = analysis.remote_branches;
            row.commit_count = analysis.commit_count;
        }
        Err(e) => {
            tracing::warn!(error = %e, "analysis failed");
            row.error = Some(e.to_string());
        }
    }
    row
}

/// Renders rows as aligned text or a JSON array
pub fn render_analysis(rows: &[AnalysisRow], destination_root: &Path, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Text => {
            let keys: Vec<String> = rows
                .iter()
                .map(|row| format!("{}/{}", row.project, row.repository))
                .collect();
            let width = keys.iter().map(|key| key.len()).max().unwrap_or(0);

            let mut lines: Vec<String> = rows
                .iter()
                .zip(&keys)
                .map(|(row, key)| {
                    let path = relative_display(Path::new(&row.path), destination_root);
                    match &row.error {
                        Some(error) => format!("{key:width$}  {path}  error: {error}"),
                        None => format!(
                            "{key:width$}  {path}  {branches} branches, {commits} commits  {names}",
                            branches = row.remote_branches.len(),
                            commits = row.commit_count,
                            names = row.remote_branches.join(", "),
                        ),
                    }
                })
                .collect();
            lines.push(format!("{} working copies analyzed", rows.len()));
            Ok(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ShutdownSignal;
    use std::time::Duration;
    use tempfile::TempDir;

    fn row(repository: &str, branches: &[&str], commits: u64) -> AnalysisRow {
        AnalysisRow {
            project: "PROJ".to_string(),
            repository: repository.to_string(),
            path: format!("/m/PROJ/{repository}"),
            remote_branches: branches.iter().map(|b| b.to_string()).collect(),
            commit_count: commits,
            error: None,
        }
    }

    #[test]
    fn test_text_report_lists_branches_and_commits() {
        let rows = vec![row("api", &["main", "dev"], 12), row("docs", &["main"], 3)];
        let text = render_analysis(&rows, Path::new("/m"), OutputFormat::Text).unwrap();

        assert!(text.contains("PROJ/api"));
        assert!(text.contains("2 branches, 12 commits  main, dev"));
        assert!(text.ends_with("2 working copies analyzed"));
    }

    #[test]
    fn test_json_report_omits_error_when_absent() {
        let mut failed = row("broken", &[], 0);
        failed.error = Some("`git branch` exited with status 128".to_string());
        let json = render_analysis(&[row("api", &["main"], 1), failed], Path::new("/m"), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["commit_count"], 1);
        assert!(value[0].get("error").is_none());
        assert!(value[1]["error"].as_str().unwrap().contains("128"));
    }

    #[test]
    fn test_activity_window_uses_git_metadata_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let copy = temp_dir.path().join("PROJ/repo");
        std::fs::create_dir_all(copy.join(".git")).unwrap();
        let now = SystemTime::now();

        assert!(recently_active(&copy, 10, now));
        assert!(!recently_active(&copy, 10, now + Duration::from_secs(30 * 60)));
        assert!(!recently_active(&temp_dir.path().join("PROJ/missing"), 10, now));
    }

    #[tokio::test]
    async fn test_nothing_starts_after_shutdown() {
        let context = SyncContext::new(tracing::Span::none(), ShutdownSignal::new());
        context.shutdown.request();
        let tasks = vec![SyncTask::existing("PROJ", "repo", "/m/PROJ/repo".into())];
        let executor = GitExecutor::default().with_program("/nonexistent/git-binary");

        assert!(analyze_all(&executor, tasks, 2, &context).await.is_empty());
    }
}
