//! Thin authenticated JSON client shared by the provider bindings

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::ProviderError;

const USER_AGENT_VALUE: &str = concat!("goobits-mirror/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client sending `Authorization: Bearer <token>` on every request
    pub(crate) fn new(base_url: &str, token: &str, accept: &'static str) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ProviderError::decode("Authorization header", e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GETs `path` with query parameters and decodes the JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = self.url(path);
        tracing::debug!(%url, ?query, "GET");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), url, &body));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::decode(url, e.to_string()))
    }
}
