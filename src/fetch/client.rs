use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends a prepared request. Wrappers add authentication on top of a base
/// client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
