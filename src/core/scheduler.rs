//! Bounded-concurrency worker pool for sync tasks

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::Instrument;

use super::progress::SyncContext;
use super::task::SyncTask;
use crate::git::Status;

/// Terminal result a worker reports for one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub status: Status,
    pub message: String,
}

impl TaskOutcome {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// A finished task and what happened to it
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task: SyncTask,
    pub outcome: TaskOutcome,
}

/// Processes a complete task list with at most `concurrency` tasks in flight
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    concurrency: usize,
}

impl Scheduler {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs every task and returns once all of them reached a terminal status
    ///
    /// Each task runs on its own tokio task, so a panic is reported as that
    /// task's failure. Once shutdown is requested, tasks still waiting for a
    /// permit finish as `Cancelled`; tasks already running are left to finish.
    /// Reports come back in completion order.
    pub async fn run<F, Fut>(&self, tasks: Vec<SyncTask>, context: &SyncContext, worker: F) -> Vec<TaskReport>
    where
        F: Fn(SyncTask) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskOutcome> + Send + 'static,
    {
        let total = tasks.len();
        let span = tracing::info_span!(parent: &context.span, "schedule", total, workers = self.concurrency);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let worker = Arc::new(worker);

        let mut futures = FuturesUnordered::new();
        for task in tasks {
            let semaphore = Arc::clone(&semaphore);
            let worker = Arc::clone(&worker);
            futures.push(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) if !context.shutdown.is_requested() => {
                        let repo_span = context.repository_span(&task);
                        let handle = tokio::spawn(worker(task.clone()).instrument(repo_span));
                        match handle.await {
                            Ok(outcome) => outcome,
                            Err(e) => {
                                tracing::error!(repo = %task.display_name(), error = %e, "sync task aborted");
                                TaskOutcome::new(Status::Failed, format!("task aborted: {e}"))
                            }
                        }
                    }
                    _ => TaskOutcome::new(Status::Cancelled, "shutdown requested"),
                };
                context.record(&task, outcome.status, &outcome.message);
                TaskReport { task, outcome }
            });
        }

        async move {
            tracing::debug!("dispatching");
            let mut reports = Vec::with_capacity(total);
            while let Some(report) = futures.next().await {
                tracing::debug!(
                    repo = %report.task.display_name(),
                    status = report.outcome.status.text(),
                    "task finished"
                );
                reports.push(report);
            }
            reports
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RepositoryDescriptor;
    use crate::utils::ShutdownSignal;
    use std::path::Path;

    fn tasks(count: usize) -> Vec<SyncTask> {
        (0..count)
            .map(|i| {
                SyncTask::new(
                    RepositoryDescriptor::new(format!("repo-{i}"), format!("https://x/{i}.git"), "P"),
                    Path::new("/m"),
                )
            })
            .collect()
    }

    fn context() -> SyncContext {
        SyncContext::new(tracing::Span::none(), ShutdownSignal::new())
    }

    #[test]
    fn test_zero_concurrency_raised_to_one() {
        assert_eq!(Scheduler::new(0).concurrency(), 1);
    }

    #[tokio::test]
    async fn test_empty_task_list_completes() {
        let reports = Scheduler::new(5)
            .run(Vec::new(), &context(), |_| async { TaskOutcome::new(Status::Updated, "") })
            .await;
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_every_task_reported() {
        let context = context();
        let reports = Scheduler::new(3)
            .run(tasks(10), &context, |_| async { TaskOutcome::new(Status::Updated, "ok") })
            .await;
        assert_eq!(reports.len(), 10);
        assert_eq!(context.statistics.completed(), 10);
    }

    #[tokio::test]
    async fn test_panicking_worker_is_isolated() {
        let reports = Scheduler::new(2)
            .run(tasks(4), &context(), |task| async move {
                if task.slug() == "repo-1" {
                    panic!("boom");
                }
                TaskOutcome::new(Status::Updated, "ok")
            })
            .await;

        let failed: Vec<_> = reports
            .iter()
            .filter(|r| r.outcome.status == Status::Failed)
            .map(|r| r.task.slug())
            .collect();
        assert_eq!(failed, vec!["repo-1"]);
        assert_eq!(reports.len(), 4);
    }

    #[tokio::test]
    async fn test_requested_shutdown_cancels_pending_tasks() {
        let context = context();
        context.shutdown.request();
        let reports = Scheduler::new(2)
            .run(tasks(3), &context, |_| async { TaskOutcome::new(Status::Updated, "ok") })
            .await;
        assert!(reports.iter().all(|r| r.outcome.status == Status::Cancelled));
    }
}
