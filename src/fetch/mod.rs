//! HTTP plumbing shared by the sheet loader and the narrative client.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Result, bail};

/// Downloads the body at `url`, failing on a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        bail!("GET {} returned status {}", url, resp.status());
    }
    Ok(resp.bytes().await?.to_vec())
}
