//! Narrative briefs from the hosted generative-language API.

pub mod client;
pub mod config;

use anyhow::Result;
use tracing::warn;

pub use client::GenerativeLanguageClient;
pub use config::NarrativeConfig;

use crate::services::narrative::{MISSING_KEY_MESSAGE, NarrativeGenerator};
use crate::summary::NarrativeSummary;

/// Writes a brief for `summary`, or the missing-key notice when no API key is
/// configured.
pub async fn write_brief(config: &NarrativeConfig, summary: &NarrativeSummary) -> Result<String> {
    match GenerativeLanguageClient::from_config(config)? {
        Some(client) => client.generate(summary).await,
        None => {
            warn!("NARRATIVE_API_KEY not set, skipping generation");
            Ok(MISSING_KEY_MESSAGE.to_string())
        }
    }
}
