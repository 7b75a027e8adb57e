use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::core::client::dto::usage_page_dto::PaginatedResponse;
use crate::core::client::dto::usage_page_query::PageQuery;
use crate::core::client::usage_endpoint::UsageEndpoint;
use crate::core::config::app_config::AppConfig;
use crate::errors::UsageError;

/// Result of a single page request that the caller has to branch on.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Page(PaginatedResponse),
    /// 404: the endpoint is not enabled for this organization.
    Unsupported,
    /// 400: the API refused the parameter combination.
    BadRequest { body: String },
}

/// Read-only access to the organization usage API.
#[async_trait]
pub trait UsageApi: Send + Sync {
    /// Fetches one page. Statuses other than 2xx/400/404 come back as `Err`.
    async fn fetch_page(
        &self,
        endpoint: UsageEndpoint,
        query: &PageQuery,
    ) -> Result<FetchOutcome, UsageError>;
}

/// `reqwest` implementation authenticated with an admin bearer key.
pub struct HttpUsageApiClient {
    client: Client,
    base_url: String,
    admin_key: String,
}

impl HttpUsageApiClient {
    pub fn new(client: Client, base_url: impl Into<String>, admin_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_key: admin_key.into(),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self::new(client, cfg.api_base_url.clone(), cfg.admin_key.clone()))
    }

    fn url_for(&self, endpoint: UsageEndpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.as_str())
    }
}

#[async_trait]
impl UsageApi for HttpUsageApiClient {
    async fn fetch_page(
        &self,
        endpoint: UsageEndpoint,
        query: &PageQuery,
    ) -> Result<FetchOutcome, UsageError> {
        let url = self.url_for(endpoint);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.admin_key)
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(|source| UsageError::Transport { endpoint, source })?;

        let status = resp.status();
        debug!(%endpoint, %status, page = ?query.page, "usage page response");

        let body = resp
            .text()
            .await
            .map_err(|source| UsageError::Transport { endpoint, source })?;

        match status {
            s if s.is_success() => {
                let page: PaginatedResponse = serde_json::from_str(&body)
                    .map_err(|source| UsageError::Decode { endpoint, source })?;
                Ok(FetchOutcome::Page(page))
            }
            StatusCode::NOT_FOUND => Ok(FetchOutcome::Unsupported),
            StatusCode::BAD_REQUEST => Ok(FetchOutcome::BadRequest { body }),
            _ => Err(UsageError::RequestRejected {
                endpoint,
                status,
                body,
            }),
        }
    }
}
