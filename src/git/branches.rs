//! Remote branch listing normalization

/// Remote every mirrored working copy tracks
pub const DEFAULT_REMOTE: &str = "origin";

pub(crate) const GIT_BRANCH_ALL_ARGS: &[&str] = &["branch", "--all", "--no-color"];

const REMOTES_PREFIX: &str = "remotes/";
const SYMBOLIC_HEAD: &str = "HEAD";
const CURRENT_BRANCH_MARKERS: &[char] = &['*', '+'];

/// Extracts bare remote branch names from `git branch --all` output
///
/// Keeps only `remotes/<remote>/...` entries, drops the symbolic
/// `remotes/<remote>/HEAD -> ...` pointer, strips current-branch markers and
/// the remote prefix. Order follows the listing; nothing is re-sorted.
pub fn parse_remote_branches(listing: &str, remote: &str) -> Vec<String> {
    let prefix = format!("{REMOTES_PREFIX}{remote}/");
    let mut branches = Vec::new();

    for line in listing.lines() {
        let line = line.trim_start_matches(|c: char| c.is_whitespace() || CURRENT_BRANCH_MARKERS.contains(&c));
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        if line.contains("->") {
            continue;
        }
        let Some(name) = token.strip_prefix(&prefix) else {
            continue;
        };
        if name.is_empty() || name == SYMBOLIC_HEAD {
            continue;
        }
        branches.push(name.to_string());
    }

    branches
}

/// Name of the remote-tracking ref for a bare branch name
pub fn remote_ref(remote: &str, branch: &str) -> String {
    format!("{remote}/{branch}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_listing_order() {
        let listing = "\
* main
  remotes/origin/HEAD -> origin/main
  remotes/origin/zeta
  remotes/origin/main
  remotes/origin/alpha";
        assert_eq!(
            parse_remote_branches(listing, "origin"),
            vec!["zeta", "main", "alpha"]
        );
    }

    #[test]
    fn test_parse_skips_local_and_other_remotes() {
        let listing = "\
  develop
* main
  remotes/origin/develop
  remotes/upstream/main
  remotes/origin-mirror/feature";
        assert_eq!(parse_remote_branches(listing, "origin"), vec!["develop"]);
    }

    #[test]
    fn test_parse_keeps_nested_branch_names() {
        let listing = "  remotes/origin/feature/login\n  remotes/origin/release/1.2";
        assert_eq!(
            parse_remote_branches(listing, "origin"),
            vec!["feature/login", "release/1.2"]
        );
    }

    #[test]
    fn test_parse_collapses_irregular_whitespace() {
        let listing = "\t remotes/origin/main   \n\n   *  remotes/origin/dev\n";
        assert_eq!(parse_remote_branches(listing, "origin"), vec!["main", "dev"]);
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_remote_branches("", "origin").is_empty());
    }

    #[test]
    fn test_remote_ref() {
        assert_eq!(remote_ref("origin", "feature/x"), "origin/feature/x");
    }
}
