//! Repository enumeration across paginated provider listings

use std::collections::HashSet;
use tracing::Instrument;

use super::error::ProviderError;
use super::rate_limit::RateLimiter;
use super::types::RepositoryDescriptor;
use super::SourceProvider;

/// What to enumerate
#[derive(Debug, Clone, Default)]
pub struct EnumerationRequest {
    /// Restrict to one project/owner; `None` walks every project the provider lists
    pub project: Option<String>,
    /// Case-insensitive substring matched against display name and slug
    pub name_filter: Option<String>,
}

/// Collects the complete repository set visible to the provider's credentials
pub struct RepositoryEnumerator<'a> {
    provider: &'a dyn SourceProvider,
    limiter: &'a RateLimiter,
    span: tracing::Span,
}

impl<'a> RepositoryEnumerator<'a> {
    pub fn new(provider: &'a dyn SourceProvider, limiter: &'a RateLimiter, parent: &tracing::Span) -> Self {
        let span = tracing::info_span!(parent: parent, "enumerate", platform = %provider.platform());
        Self {
            provider,
            limiter,
            span,
        }
    }

    /// Returns the deduplicated, order-preserving descriptor list
    ///
    /// Any provider failure aborts the whole enumeration; nothing partial is returned.
    pub async fn enumerate(
        &self,
        request: &EnumerationRequest,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        self.enumerate_inner(request).instrument(self.span.clone()).await
    }

    async fn enumerate_inner(
        &self,
        request: &EnumerationRequest,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        let projects = match &request.project {
            Some(project) => vec![project.clone()],
            None => {
                self.limiter.acquire(self.provider).await?;
                self.provider.list_projects().await?
            }
        };
        tracing::debug!(count = projects.len(), "projects to enumerate");

        let mut all = Vec::new();
        for project in &projects {
            let repos = self.enumerate_project(project).await?;
            tracing::info!(project = %project, count = repos.len(), "enumerated project");
            all.extend(repos);
        }

        let unique = dedup_descriptors(all);
        let filtered = match request.name_filter.as_deref() {
            Some(filter) => apply_name_filter(unique, filter),
            None => unique,
        };

        if filtered.is_empty() {
            tracing::warn!("no repositories matched");
        }
        Ok(filtered)
    }

    /// Requests pages until one comes back short (or empty)
    async fn enumerate_project(&self, project: &str) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        let page_size = self.provider.page_size();
        let mut repos = Vec::new();
        let mut page = 0;

        if self.provider.needs_project_resolution(project) {
            self.limiter.acquire(self.provider).await?;
            self.provider.resolve_project(project).await?;
        }

        loop {
            self.limiter.acquire(self.provider).await?;
            let items = self
                .provider
                .list_repositories(Some(project), page, page_size)
                .await?;
            let returned = items.len();
            tracing::debug!(project, page, returned, "fetched page");
            repos.extend(items);

            if returned < page_size {
                break;
            }
            page += 1;
        }

        Ok(repos)
    }
}

/// Drops later descriptors that map to an already-seen local directory
pub fn dedup_descriptors(descriptors: Vec<RepositoryDescriptor>) -> Vec<RepositoryDescriptor> {
    let mut seen = HashSet::with_capacity(descriptors.len());
    descriptors
        .into_iter()
        .filter(|descriptor| {
            let key = (descriptor.project.clone(), descriptor.slug());
            if seen.insert(key) {
                true
            } else {
                tracing::debug!(repo = %descriptor.name, project = %descriptor.project, "duplicate repository dropped");
                false
            }
        })
        .collect()
}

/// Keeps descriptors whose name or slug contains `filter`, ignoring case
pub fn apply_name_filter(descriptors: Vec<RepositoryDescriptor>, filter: &str) -> Vec<RepositoryDescriptor> {
    descriptors
        .into_iter()
        .filter(|descriptor| matches_name_filter(descriptor, filter))
        .collect()
}

pub fn matches_name_filter(descriptor: &RepositoryDescriptor, filter: &str) -> bool {
    let needle = filter.to_lowercase();
    descriptor.name.to_lowercase().contains(&needle) || descriptor.slug().contains(&needle)
}
