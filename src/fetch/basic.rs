use super::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Plain reqwest-backed [`HttpClient`] with connect and request timeouts.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Fails when the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
