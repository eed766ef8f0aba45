//! Path display helpers

use std::path::Path;

/// Shortens long paths for display, keeping the last two components
pub fn shorten_path(path: &str, max_length: usize) -> String {
    if path.chars().count() <= max_length {
        return path.to_string();
    }

    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match components.as_slice() {
        [.., project, repo] if components.len() > 2 => format!(".../{project}/{repo}"),
        _ => path.to_string(),
    }
}

/// `path` relative to `root` when it lies underneath, otherwise unchanged
pub fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
