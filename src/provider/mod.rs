//! Hosting service bindings and repository enumeration

pub mod enumerate;
pub mod error;
pub mod github;
pub(crate) mod http;
pub mod rate_limit;
pub mod stash;
pub mod types;

use async_trait::async_trait;

pub use enumerate::{EnumerationRequest, RepositoryEnumerator};
pub use error::ProviderError;
pub use github::GitHubProvider;
pub use rate_limit::RateLimiter;
pub use stash::StashProvider;
pub use types::{slugify, Platform, RateLimitStatus, RepositoryDescriptor};

/// The capability the engine needs from a hosting service
#[async_trait]
pub trait SourceProvider: Send + Sync {
    fn platform(&self) -> Platform;

    /// Items requested per listing page
    fn page_size(&self) -> usize;

    /// Project keys (Stash) or the single owner login (GitHub)
    async fn list_projects(&self) -> Result<Vec<String>, ProviderError>;

    /// True when `resolve_project` must run before `project` is listed
    fn needs_project_resolution(&self, _project: &str) -> bool {
        false
    }

    /// Per-project lookup made once, after the rate limiter admits it
    async fn resolve_project(&self, _project: &str) -> Result<(), ProviderError> {
        Ok(())
    }

    /// One zero-based page of repositories, optionally scoped to a project
    async fn list_repositories(
        &self,
        project: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError>;

    /// `None` when the provider exposes no quota API
    async fn rate_limit_status(&self) -> Result<Option<RateLimitStatus>, ProviderError>;
}

/// Identity of the hosting service for one run
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub platform: Platform,
    pub token: String,
    /// GitHub user/organization; ignored by Stash
    pub owner: Option<String>,
    /// Stash base URL, or a GitHub Enterprise API URL
    pub server_url: Option<String>,
}

/// Builds the concrete binding for the configured platform
pub fn connect(settings: &ProviderSettings) -> Result<Box<dyn SourceProvider>, ProviderError> {
    match settings.platform {
        Platform::GitHub => {
            let owner = settings.owner.as_deref().unwrap_or_default();
            Ok(Box::new(GitHubProvider::new(
                owner,
                &settings.token,
                settings.server_url.as_deref(),
            )?))
        }
        Platform::Stash => {
            let server_url = settings.server_url.as_deref().unwrap_or_default();
            Ok(Box::new(StashProvider::new(server_url, &settings.token)?))
        }
    }
}
