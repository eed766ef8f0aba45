//! Provider-independent repository and quota types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Hosting service family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub-style user/organization repositories
    GitHub,
    /// Bitbucket-Server-style project repositories
    Stash,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GitHub => "github",
            Platform::Stash => "stash",
        }
    }

    /// Stash scopes repositories by project and needs a server URL
    pub fn requires_server_url(&self) -> bool {
        matches!(self, Platform::Stash)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(Platform::GitHub),
            "stash" | "bitbucket" => Ok(Platform::Stash),
            other => Err(ConfigError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Derives the local directory segment for a repository display name
///
/// Lower-cases the name and replaces spaces with dashes: `"My Repo"` -> `"my-repo"`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// A repository visible to the configured credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    /// Display name as reported by the hosting service
    pub name: String,
    /// URL handed to `git clone`
    pub clone_url: String,
    /// Owning project key (Stash) or owner login (GitHub)
    pub project: String,
}

impl RepositoryDescriptor {
    pub fn new(
        name: impl Into<String>,
        clone_url: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
            project: project.into(),
        }
    }

    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Remaining API quota as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}
