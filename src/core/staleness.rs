//! Staleness markers: skip repositories synced within the last few minutes
//!
//! A marker is an empty file at `destination/<project>/.markers/<slug>` whose
//! modification time records the last time the repository was judged due.

use filetime::FileTime;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::config::MARKERS_DIR_NAME;

/// Decides per repository whether enough time has passed to sync again
#[derive(Debug, Clone)]
pub struct StalenessCache {
    root: PathBuf,
    threshold_minutes: u64,
}

impl StalenessCache {
    /// Thresholds below one minute are raised to one
    pub fn new(root: impl Into<PathBuf>, threshold_minutes: u64) -> Self {
        Self {
            root: root.into(),
            threshold_minutes: threshold_minutes.max(1),
        }
    }

    pub fn threshold_minutes(&self) -> u64 {
        self.threshold_minutes
    }

    pub fn marker_path(&self, project: &str, slug: &str) -> PathBuf {
        self.root.join(project).join(MARKERS_DIR_NAME).join(slug)
    }

    /// True when the repository is due; touching the marker in that case
    pub fn should_sync(&self, project: &str, slug: &str) -> io::Result<bool> {
        self.should_sync_at(project, slug, SystemTime::now())
    }

    /// `should_sync` against an explicit clock
    pub fn should_sync_at(&self, project: &str, slug: &str, now: SystemTime) -> io::Result<bool> {
        let marker = self.marker_path(project, slug);
        let due = match marker_age_minutes(&marker, now)? {
            Some(age) => age >= self.threshold_minutes,
            None => true,
        };

        if due {
            touch_marker(&marker, now)?;
        } else {
            tracing::debug!(project, slug, threshold = self.threshold_minutes, "marker fresh, skipping");
        }
        Ok(due)
    }

    /// Restarts the marker's clock regardless of its age
    pub fn touch(&self, project: &str, slug: &str) -> io::Result<()> {
        touch_marker(&self.marker_path(project, slug), SystemTime::now())
    }
}

/// Whole minutes since the marker was last touched
///
/// `None` when there is no marker or its timestamp lies in the future; both
/// count as due.
pub fn marker_age_minutes(marker: &Path, now: SystemTime) -> io::Result<Option<u64>> {
    let modified = match fs::metadata(marker) {
        Ok(metadata) => metadata.modified()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(now
        .duration_since(modified)
        .ok()
        .map(|age: Duration| age.as_secs() / 60))
}

fn touch_marker(marker: &Path, now: SystemTime) -> io::Result<()> {
    if let Some(parent) = marker.parent() {
        // Sibling tasks race to create the same project directory
        match fs::create_dir_all(parent) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(marker)?;
    filetime::set_file_mtime(marker, FileTime::from_system_time(now))
}
