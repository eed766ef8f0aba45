//! Unit of work submitted to the sync scheduler

use std::path::{Path, PathBuf};

use crate::provider::RepositoryDescriptor;

/// One repository to clone-or-update, owned by exactly one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTask {
    pub descriptor: RepositoryDescriptor,
    /// `destination/<project>/<slug>`
    pub destination: PathBuf,
    /// Clone when the working copy is absent; existing-only runs never clone
    pub clone_if_missing: bool,
}

impl SyncTask {
    /// Task for an enumerated repository under `destination_root`
    pub fn new(descriptor: RepositoryDescriptor, destination_root: &Path) -> Self {
        let destination = working_copy_path(destination_root, &descriptor.project, &descriptor.slug());
        Self {
            descriptor,
            destination,
            clone_if_missing: true,
        }
    }

    /// Task for a working copy already on disk, discovered without the provider
    pub fn existing(project: &str, directory_name: &str, path: PathBuf) -> Self {
        Self {
            descriptor: RepositoryDescriptor::new(directory_name, String::new(), project),
            destination: path,
            clone_if_missing: false,
        }
    }

    pub fn project(&self) -> &str {
        &self.descriptor.project
    }

    pub fn slug(&self) -> String {
        self.descriptor.slug()
    }

    /// `project/slug`, used in logs and summaries
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.descriptor.project, self.slug())
    }
}

/// Local directory for a repository: `destination/<project>/<slug>`
pub fn working_copy_path(destination_root: &Path, project: &str, slug: &str) -> PathBuf {
    destination_root.join(project).join(slug)
}
