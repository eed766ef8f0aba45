//! Clone-and-sync and sync-existing command implementations
//!
//! Both build a complete task list first, then hand it to the scheduler. Each
//! task passes the staleness gate and, when due, the branch reconciler.

use anyhow::Result;
use std::sync::Arc;

use super::enumerate_repositories;
use crate::core::{
    find_working_copies, set_terminal_title, set_terminal_title_and_flush, Scheduler,
    StalenessCache, SyncContext, SyncStatistics, SyncTask, TaskOutcome, MirrorConfig,
    ENUMERATING_MESSAGE, NO_REPOS_MESSAGE,
};
use crate::git::{is_working_copy, BranchReconciler, CommandExecutor, GitExecutor, Status};
use crate::provider::enumerate::matches_name_filter;

const RUNNING_TITLE: &str = "🪞 mirror";
const DONE_TITLE: &str = "✅ mirror";
const FRESH_MESSAGE: &str = "synced recently";

/// Enumerates the hosting service and syncs every repository, cloning missing ones
pub async fn handle_clone_all(config: &MirrorConfig, context: SyncContext, show_progress: bool) -> Result<()> {
    set_terminal_title(RUNNING_TITLE);
    if show_progress {
        eprintln!("{ENUMERATING_MESSAGE}");
    }

    let descriptors = match enumerate_repositories(config, &context).await {
        Ok(descriptors) => descriptors,
        Err(e) => {
            set_terminal_title_and_flush(DONE_TITLE);
            return Err(e.into());
        }
    };
    let tasks = descriptors
        .into_iter()
        .map(|descriptor| SyncTask::new(descriptor, &config.destination))
        .collect();

    run_tasks(config, context, tasks, show_progress).await
}

/// Syncs working copies already under the destination, never cloning
pub async fn handle_sync_existing(config: &MirrorConfig, context: SyncContext, show_progress: bool) -> Result<()> {
    set_terminal_title(RUNNING_TITLE);

    let root = config.destination.clone();
    let discovered = tokio::task::spawn_blocking(move || find_working_copies(root)).await?;
    let tasks = select_existing(discovered, config.project.as_deref(), config.name_filter.as_deref());
    tracing::info!(parent: &context.span, count = tasks.len(), "existing working copies selected");

    run_tasks(config, context, tasks, show_progress).await
}

/// Applies the project and name filters to discovered working copies
pub fn select_existing(tasks: Vec<SyncTask>, project: Option<&str>, name_filter: Option<&str>) -> Vec<SyncTask> {
    tasks
        .into_iter()
        .filter(|task| project.map_or(true, |project| task.project() == project))
        .filter(|task| name_filter.map_or(true, |filter| matches_name_filter(&task.descriptor, filter)))
        .collect()
}

async fn run_tasks(config: &MirrorConfig, context: SyncContext, tasks: Vec<SyncTask>, show_progress: bool) -> Result<()> {
    if tasks.is_empty() {
        println!("{NO_REPOS_MESSAGE}");
        set_terminal_title_and_flush(DONE_TITLE);
        return Ok(());
    }

    let total = tasks.len();
    let context = if show_progress {
        context.with_progress_bar(total, RUNNING_TITLE)?
    } else {
        context
    };

    let cache = Arc::new(StalenessCache::new(&config.destination, config.staleness_minutes));
    let reconciler = Arc::new(BranchReconciler::new(GitExecutor::new(config.command_timeout)));
    let statistics = Arc::clone(&context.statistics);
    let scheduler = Scheduler::new(config.concurrency);
    tracing::info!(parent: &context.span, total, workers = scheduler.concurrency(), "syncing repositories");

    scheduler
        .run(tasks, &context, move |task| {
            let cache = Arc::clone(&cache);
            let reconciler = Arc::clone(&reconciler);
            let statistics = Arc::clone(&statistics);
            async move { sync_repository(&task, &cache, &reconciler, &statistics).await }
        })
        .await;

    println!("{}", context.finish(total));
    let details = context.statistics.generate_detailed_summary();
    if !details.is_empty() {
        println!("\n{details}");
    }

    set_terminal_title_and_flush(DONE_TITLE);
    Ok(())
}

/// One task's pipeline: staleness gate, then clone-or-reconcile
///
/// A working copy that is absent bypasses the gate: it is cloned regardless of
/// the marker's age, and the marker is restarted.
pub async fn sync_repository<E: CommandExecutor>(
    task: &SyncTask,
    cache: &StalenessCache,
    reconciler: &BranchReconciler<E>,
    statistics: &SyncStatistics,
) -> TaskOutcome {
    let project = task.project();
    let slug = task.slug();

    if is_working_copy(&task.destination) {
        match cache.should_sync(project, &slug) {
            Ok(true) => {}
            Ok(false) => return TaskOutcome::new(Status::Fresh, FRESH_MESSAGE),
            Err(e) => tracing::warn!(error = %e, "staleness marker unavailable, syncing anyway"),
        }
    } else if let Err(e) = cache.touch(project, &slug) {
        tracing::warn!(error = %e, "could not write staleness marker");
    }

    let report = reconciler.sync(task).await;
    statistics.record_branches(report.reset_branches.len(), report.created_branches.len());

    let status = report.status();
    match status {
        Status::Failed => tracing::error!(error = %report.message(), "sync failed"),
        Status::Partial => {
            for failure in &report.branch_failures {
                tracing::warn!(branch = %failure.branch, error = %failure.error, "branch not reconciled");
            }
        }
        _ => tracing::info!(status = status.text(), detail = %report.message(), "synced"),
    }
    TaskOutcome::new(status, report.message())
}
