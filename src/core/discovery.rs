//! Discovery of working copies already mirrored under the destination root

use ignore::WalkBuilder;
use std::path::Path;

use super::task::SyncTask;
use crate::git::is_working_copy;

// destination/<project>/<repo>
const WORKING_COPY_DEPTH: usize = 2;

/// Finds `destination/<project>/<repo>` directories that hold a `.git`
///
/// Hidden directories (such as `.markers`) are skipped at both levels.
/// Results are sorted by project, then repository, case-insensitively.
pub fn find_working_copies(destination_root: impl AsRef<Path>) -> Vec<SyncTask> {
    let root = destination_root.as_ref();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .follow_links(true)
        .max_depth(Some(WORKING_COPY_DEPTH))
        .build();

    let mut tasks: Vec<SyncTask> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.depth() == WORKING_COPY_DEPTH)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_dir()))
        .filter(|entry| is_working_copy(entry.path()))
        .filter_map(|entry| {
            let path = entry.path();
            let repo = path.file_name()?.to_str()?;
            let project = path.parent()?.file_name()?.to_str()?;
            Some(SyncTask::existing(project, repo, path.to_path_buf()))
        })
        .collect();

    tasks.sort_by_key(|task| (task.project().to_lowercase(), task.descriptor.name.to_lowercase()));
    tasks
}
