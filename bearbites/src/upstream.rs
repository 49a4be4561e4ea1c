//! Fetching raw HTML from the menu vendor.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::VendorConfig;
use crate::error::{BearBitesError, Result};

#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Body of a successful (2xx) response. Any other status is an error.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &VendorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HtmlFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BearBitesError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        tracing::debug!(url, bytes = body.len(), "Fetched vendor page");
        Ok(body)
    }
}
