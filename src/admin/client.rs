//! HTTP client for Caddy's admin API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;

/// Errors talking to the admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Connection failure, timeout, or unreadable body.
    #[error("caddy request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Caddy answered with a non-success status.
    #[error("caddy responded {status}: {body}")]
    Status { status: u16, body: String },
}

/// Operations the sync loops need from the external service.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Fetch the current document. `None` when the service has none yet.
    async fn fetch_config(&self) -> Result<Option<String>, AdminError>;

    /// Replace the service's document, returning the response body.
    async fn load_config(&self, document: &str) -> Result<String, AdminError>;
}

/// `AdminApi` backed by reqwest.
#[derive(Debug, Clone)]
pub struct CaddyAdminClient {
    client: Client,
    base_url: String,
}

impl CaddyAdminClient {
    pub fn new(admin_url: &str, timeout: Duration) -> Result<Self, AdminError> {
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self {
            client,
            base_url: admin_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_body(response: reqwest::Response) -> Result<String, AdminError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AdminError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl AdminApi for CaddyAdminClient {
    async fn fetch_config(&self) -> Result<Option<String>, AdminError> {
        let response = self
            .client
            .get(format!("{}/config", self.base_url))
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(parse_config_body(body))
    }

    async fn load_config(&self, document: &str) -> Result<String, AdminError> {
        let response = self
            .client
            .post(format!("{}/load", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .body(document.to_string())
            .send()
            .await?;
        Self::read_body(response).await
    }
}

/// Caddy reports an unconfigured server as the literal `null`.
fn parse_config_body(body: String) -> Option<String> {
    if body.trim() == "null" {
        None
    } else {
        Some(body)
    }
}
