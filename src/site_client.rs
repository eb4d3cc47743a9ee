//! Client for this service's own HTTP API
//!
//! Server-rendered pages and the interactive search box talk to the JSON
//! routes through `SiteClient`, addressed by the configured public base URL.

use crate::config::Config;
use crate::models::{SearchResponse, WorkDetail, WorkSummary};
use crate::search_session::SearchBackend;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Request to site API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Site API returned status {0}")]
    Status(u16),
}

#[derive(Clone)]
pub struct SiteClient {
    client: Client,
    base_url: String,
}

impl SiteClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client for `server.public_base_url`, with the configured outbound
    /// HTTP settings
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = config.upstream.create_http_client()?;
        Ok(Self::new(client, &config.server.public_base_url))
    }

    pub fn search_url(&self) -> String {
        format!("{}/api/search", self.base_url)
    }

    pub fn work_url(&self, id: &str) -> String {
        format!("{}/api/works/{}", self.base_url, id)
    }

    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<WorkSummary>, SiteError> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", query.to_string()), ("limit", limit.to_string())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SiteError::Status(response.status().as_u16()));
        }
        let body: SearchResponse = response.json().await?;
        Ok(body.items)
    }

    /// Detail record for a work; `None` when the API reports it missing
    pub async fn work_detail(&self, id: &str) -> Result<Option<WorkDetail>, SiteError> {
        let response = self.client.get(self.work_url(id)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(SiteError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl SearchBackend for SiteClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<WorkSummary>, SiteError> {
        SiteClient::search(self, query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let site = SiteClient::new(Client::new(), "http://localhost:8080/");
        assert_eq!(site.search_url(), "http://localhost:8080/api/search");
        assert_eq!(site.work_url("abc"), "http://localhost:8080/api/works/abc");
    }

    #[test]
    fn test_from_config_uses_public_base_url() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| {
            (key == crate::config::PUBLIC_BASE_URL_ENV).then(|| "https://shelf.example/".to_string())
        });
        let site = SiteClient::from_config(&config).unwrap();
        assert_eq!(site.search_url(), "https://shelf.example/api/search");

        let site = SiteClient::from_config(&Config::default()).unwrap();
        assert_eq!(site.work_url("m1"), "http://localhost:8080/api/works/m1");
    }
}
