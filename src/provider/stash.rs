//! Bitbucket Server (Stash) binding: repositories grouped by project

use async_trait::async_trait;
use serde::Deserialize;

use super::error::ProviderError;
use super::http::ApiClient;
use super::types::{Platform, RateLimitStatus, RepositoryDescriptor};
use super::SourceProvider;

pub const STASH_PAGE_SIZE: usize = 50;
const STASH_API_PREFIX: &str = "/rest/api/1.0";
const STASH_ACCEPT: &str = "application/json";
const PREFERRED_CLONE_PROTOCOL: &str = "http";

#[derive(Deserialize)]
struct StashPage<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
}

#[derive(Deserialize)]
struct StashProject {
    key: String,
}

#[derive(Deserialize)]
struct StashRepo {
    name: String,
    project: StashProject,
    #[serde(default)]
    links: StashLinks,
}

#[derive(Deserialize, Default)]
struct StashLinks {
    #[serde(default)]
    clone: Vec<StashCloneLink>,
}

#[derive(Deserialize)]
struct StashCloneLink {
    href: String,
    #[serde(default)]
    name: String,
}

impl StashRepo {
    /// Prefers the `http` clone link, falls back to the first one listed
    fn clone_url(&self) -> Option<&str> {
        self.links
            .clone
            .iter()
            .find(|link| link.name == PREFERRED_CLONE_PROTOCOL)
            .or_else(|| self.links.clone.first())
            .map(|link| link.href.as_str())
    }

    fn into_descriptor(self) -> Option<RepositoryDescriptor> {
        let clone_url = self.clone_url()?.to_string();
        Some(RepositoryDescriptor::new(self.name, clone_url, self.project.key))
    }
}

pub struct StashProvider {
    http: ApiClient,
}

impl StashProvider {
    pub fn new(server_url: &str, token: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            http: ApiClient::new(server_url, token, STASH_ACCEPT)?,
        })
    }

    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<T>, ProviderError> {
        let page: StashPage<T> = self
            .http
            .get_json(
                &format!("{STASH_API_PREFIX}{path}"),
                &[
                    ("start", (page * page_size).to_string()),
                    ("limit", page_size.to_string()),
                ],
            )
            .await?;
        Ok(page.values)
    }
}

fn repos_path(project: Option<&str>) -> String {
    match project {
        Some(key) => format!("/projects/{key}/repos"),
        None => "/repos".to_string(),
    }
}

#[async_trait]
impl SourceProvider for StashProvider {
    fn platform(&self) -> Platform {
        Platform::Stash
    }

    fn page_size(&self) -> usize {
        STASH_PAGE_SIZE
    }

    async fn list_projects(&self) -> Result<Vec<String>, ProviderError> {
        let mut keys = Vec::new();
        let mut page = 0;
        loop {
            let projects: Vec<StashProject> = self.get_page("/projects", page, STASH_PAGE_SIZE).await?;
            let full_page = projects.len() == STASH_PAGE_SIZE;
            keys.extend(projects.into_iter().map(|project| project.key));
            if !full_page {
                break;
            }
            page += 1;
        }
        Ok(keys)
    }

    async fn list_repositories(
        &self,
        project: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<RepositoryDescriptor>, ProviderError> {
        let repos: Vec<StashRepo> = self.get_page(&repos_path(project), page, page_size).await?;
        Ok(repos
            .into_iter()
            .filter_map(|repo| {
                let name = repo.name.clone();
                let descriptor = repo.into_descriptor();
                if descriptor.is_none() {
                    tracing::warn!(repo = %name, "repository has no clone link, skipping");
                }
                descriptor
            })
            .collect())
    }

    async fn rate_limit_status(&self) -> Result<Option<RateLimitStatus>, ProviderError> {
        // Bitbucket Server exposes no quota endpoint
        Ok(None)
    }
}
