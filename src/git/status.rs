//! Repository sync status enumeration and utilities

/// Terminal status of one repository's sync task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Working copy was cloned and every branch reconciled
    Cloned,
    /// Existing working copy fetched and every branch reconciled
    Updated,
    /// Skipped because the staleness marker is still fresh
    Fresh,
    /// Reconciled, but one or more branches failed
    Partial,
    /// Clone, fetch or branch listing failed
    Failed,
    /// Never dispatched because shutdown was requested
    Cancelled,
}

impl Status {
    /// Returns the emoji symbol for this status
    pub fn symbol(&self) -> &str {
        match self {
            Status::Cloned | Status::Updated => "🟢",
            Status::Fresh | Status::Cancelled => "🟠",
            Status::Partial => "🟡",
            Status::Failed => "🔴",
        }
    }

    /// Returns the text representation of this status
    pub fn text(&self) -> &str {
        match self {
            Status::Cloned => "cloned",
            Status::Updated => "updated",
            Status::Fresh => "fresh",
            Status::Partial => "partial",
            Status::Failed => "failed",
            Status::Cancelled => "cancelled",
        }
    }

    /// True for statuses where every requested step succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Cloned | Status::Updated | Status::Fresh)
    }
}
