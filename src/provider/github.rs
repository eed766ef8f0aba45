//! GitHub binding: repositories owned by a user or an organization

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;

use super::error::ProviderError;
use super::http::ApiClient;
use super::types::{Platform, RateLimitStatus, RepositoryDescriptor};
use super::SourceProvider;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_PAGE_SIZE: usize = 30;
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnerKind {
    User,
    Organization,
}

#[derive(Deserialize)]
struct GitHubOwner {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct GitHubRepo {
    name: String,
    clone_url: String,
}

#[derive(Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Deserialize)]
struct RateLimitResources {
    core: CoreRateLimit,
}

#[derive(Deserialize)]
struct CoreRateLimit {
    remaining: u64,
    reset: i64,
}

pub struct GitHubProvider {
    http: ApiClient,
    owner: String,
    owner_kinds: Mutex<HashMap<String, OwnerKind>>,
}

impl GitHubProvider {
    /// `api_url` overrides the public API endpoint (GitHub Enterprise)
    pub fn new(owner: &str, token: &str, api_url: Option<&str>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: ApiClient::new(api_url.unwrap_or(GITHUB_API_URL), token, GITHUB_ACCEPT)?,
            owner: owner.to_string(),
            owner_kinds: Mutex::new(HashMap::new()),
        })
    }

    fn cached_owner_kind(&self, owner: &str) -> Option<OwnerKind> {
        self.owner_kinds
            .lock()
            .ok()
            .and_then(|kinds| kinds.get(owner).copied())
    }

    async fn owner_kind(&self, owner: &str) -> Result<OwnerKind, ProviderError> {
        if let Some(kind) = self.cached_owner_kind(owner) {
            return Ok(kind);
        }

        let info: GitHubOwner = self.http.get_json(&format!("/users/{owner}"), &[]).await?;
        let kind = if info.kind == "Organization" {
            OwnerKind::Organization
        } else {
            OwnerKind::User
        };
        tracing::debug!(owner, ?kind, "resolved GitHub owner");

        if let Ok(mut kinds) = self.owner_kinds.lock() {
            kinds.insert(owner.to_string(), kind);
        }
        Ok(kind)
    }
}

fn repos_path(owner: &str, kind: OwnerKind) -> String {
    match kind {
        OwnerKind::Organization => format!("/orgs/{owner}/repos"),
        OwnerKind::User => format!("/users/{owner}/repos"),
    }
}

fn to_rate_limit_status(limit: &CoreRateLimit) -> Option<RateLimitStatus> {
    DateTime::<Utc>::from_timestamp(limit.reset, 0).map(|reset_at| RateLimitStatus {
        remaining: limit.remaining,
        reset_at,
    })
}

#[async_trait]
impl SourceProvider for GitHubProvider {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    fn page_size(&self) -> usize {
        GITHUB_PAGE_SIZE
    }

    async fn list_projects(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![self.owner.clone()])
    }

    fn needs_project_resolution(&self, project: &str) -> bool {
        self.cached_owner_kind(project).is_none()
    }

    /// Looks up whether the owner is a user or an organization
    async fn resolve_project(&self, project: &str) -> Result<(), ProviderError> {
        self.owner_kind(project).await.map(|_| ())
    }

    async fn list_repositories(
        &self,
        project: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        let owner = project.unwrap_or(&self.owner);
        let kind = self.owner_kind(owner).await?;
        let repos: Vec<GitHubRepo> = self
            .http
            .get_json(
                &repos_path(owner, kind),
                &[
                    ("page", (page + 1).to_string()),
                    ("per_page", page_size.to_string()),
                ],
            )
            .await?;

        Ok(repos
            .into_iter()
            .map(|repo| RepositoryDescriptor::new(repo.name, repo.clone_url, owner))
            .collect())
    }

    async fn rate_limit_status(&self) -> Result<Option<RateLimitStatus>, ProviderError> {
        let response: RateLimitResponse = self.http.get_json("/rate_limit", &[]).await?;
        let status = to_rate_limit_status(&response.resources.core);
        if status.is_none() {
            return Err(ProviderError::decode(
                self.http.url("/rate_limit"),
                format!("invalid reset timestamp {}", response.resources.core.reset),
            ));
        }
        Ok(status)
    }
}
