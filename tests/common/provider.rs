//! In-memory hosting service

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use goobits_mirror::provider::{Platform, ProviderError, RateLimitStatus, RepositoryDescriptor, SourceProvider};

/// Serves canned projects page by page and records what was asked for
pub struct FakeProvider {
    projects: Vec<(String, Vec<RepositoryDescriptor>)>,
    page_size: usize,
    fail_on_page: Option<usize>,
    has_quota_api: bool,
    resolves_projects: bool,
    quota: Mutex<VecDeque<RateLimitStatus>>,
    requests: Mutex<Vec<(String, usize, usize)>>,
    resolved: Mutex<Vec<String>>,
    events: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(page_size: usize) -> Self {
        Self {
            projects: Vec::new(),
            page_size,
            fail_on_page: None,
            has_quota_api: true,
            resolves_projects: false,
            quota: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            resolved: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Adds a project holding `count` repositories named `<project>-repo-<n>`
    pub fn with_project(mut self, project: &str, count: usize) -> Self {
        let repos = (0..count)
            .map(|i| {
                let name = format!("{project}-repo-{i}");
                RepositoryDescriptor::new(name.clone(), format!("https://git.example.com/{project}/{name}.git"), project)
            })
            .collect();
        self.projects.push((project.to_string(), repos));
        self
    }

    pub fn with_repositories(mut self, project: &str, repos: Vec<RepositoryDescriptor>) -> Self {
        self.projects.push((project.to_string(), repos));
        self
    }

    pub fn failing_on_page(mut self, page: usize) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    pub fn without_quota_api(mut self) -> Self {
        self.has_quota_api = false;
        self
    }

    /// Requires a one-time lookup per project, like the GitHub owner kind
    pub fn with_project_resolution(mut self) -> Self {
        self.resolves_projects = true;
        self
    }

    /// Every call in order: `quota`, `resolve <project>`, `list <project> <page>`
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Quota answers handed out before the default "plenty left"
    pub fn with_quota(self, status: RateLimitStatus) -> Self {
        self.quota.lock().unwrap().push_back(status);
        self
    }

    /// `(project, page, items returned)` per listing call
    pub fn requests(&self) -> Vec<(String, usize, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceProvider for FakeProvider {
    fn platform(&self) -> Platform {
        Platform::Stash
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn list_projects(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.projects.iter().map(|(key, _)| key.clone()).collect())
    }

    fn needs_project_resolution(&self, project: &str) -> bool {
        self.resolves_projects && !self.resolved.lock().unwrap().iter().any(|key| key == project)
    }

    async fn resolve_project(&self, project: &str) -> Result<(), ProviderError> {
        self.events.lock().unwrap().push(format!("resolve {project}"));
        self.resolved.lock().unwrap().push(project.to_string());
        Ok(())
    }

    async fn list_repositories(
        &self,
        project: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        let project = project.unwrap_or_default();
        self.events.lock().unwrap().push(format!("list {project} {page}"));
        if self.fail_on_page == Some(page) {
            return Err(ProviderError::Http {
                status: 500,
                url: format!("fake://{project}?page={page}"),
                message: "internal error".to_string(),
            });
        }

        let items: Vec<RepositoryDescriptor> = self
            .projects
            .iter()
            .find(|(key, _)| key == project)
            .map(|(_, repos)| repos.iter().skip(page * page_size).take(page_size).cloned().collect())
            .unwrap_or_default();
        self.requests
            .lock()
            .unwrap()
            .push((project.to_string(), page, items.len()));
        Ok(items)
    }

    async fn rate_limit_status(&self) -> Result<Option<RateLimitStatus>, ProviderError> {
        self.events.lock().unwrap().push("quota".to_string());
        if !self.has_quota_api {
            return Ok(None);
        }
        let next = self.quota.lock().unwrap().pop_front();
        Ok(Some(next.unwrap_or(RateLimitStatus {
            remaining: 5000,
            reset_at: chrono::Utc::now(),
        })))
    }
}
