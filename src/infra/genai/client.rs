use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::NarrativeConfig;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient};
use crate::services::narrative::{NarrativeGenerator, SYSTEM_INSTRUCTION, build_prompt};
use crate::summary::NarrativeSummary;

/// Returned when the service answers without any text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "No insights generated.";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, with its parts joined.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Client for the hosted generative-language `generateContent` endpoint.
pub struct GenerativeLanguageClient<C> {
    http: C,
    endpoint: String,
    temperature: f32,
}

impl GenerativeLanguageClient<ApiKey<BasicClient>> {
    /// Builds a client authenticated with the configured key, or `None` when
    /// no key is set.
    pub fn from_config(config: &NarrativeConfig) -> Result<Option<Self>> {
        let Some(key) = config.api_key.as_deref() else {
            return Ok(None);
        };
        let http = ApiKey::new(BasicClient::new()?, API_KEY_HEADER, key)?;
        Ok(Some(Self::with_client(http, config)))
    }
}

impl<C: HttpClient> GenerativeLanguageClient<C> {
    pub fn with_client(http: C, config: &NarrativeConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/models/{}:generateContent", config.base_url, config.model),
            temperature: config.temperature,
        }
    }

    fn build_request(&self, prompt: &str) -> Result<Request> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let mut req = Request::new(Method::POST, self.endpoint.parse()?);
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(serde_json::to_vec(&body)?.into());
        Ok(req)
    }
}

#[async_trait]
impl<C: HttpClient> NarrativeGenerator for GenerativeLanguageClient<C> {
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn generate(&self, summary: &NarrativeSummary) -> Result<String> {
        let prompt = build_prompt(summary)?;
        let req = self.build_request(&prompt)?;

        let response = self
            .http
            .execute(req)
            .await
            .map_err(|e| anyhow!("Failed to send generation request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Generation failed with status {}: {}", status, body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse generation response: {}", e))?;

        let text = parsed.text();
        debug!(empty = text.is_none(), "Generation response received");
        Ok(text.unwrap_or_else(|| EMPTY_RESPONSE_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::genai::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};

    fn config() -> NarrativeConfig {
        NarrativeConfig {
            api_key: Some("key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.3,
        }
    }

    #[test]
    fn test_no_client_without_key() {
        let mut config = config();
        config.api_key = None;
        assert!(GenerativeLanguageClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_request_shape() {
        let client = GenerativeLanguageClient::with_client(BasicClient::new().unwrap(), &config());
        let req = client.build_request("hello").unwrap();

        assert_eq!(req.method(), &Method::POST);
        assert_eq!(
            req.url().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");

        let bytes = req.body().and_then(|b| b.as_bytes()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
        assert!(body["systemInstruction"].get("role").is_none());
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let parsed: GenerateResponse = serde_json::from_str(
            r###"{"candidates":[{"content":{"parts":[{"text":"## Brief"},{"text":"\nAll good."}]}}]}"###,
        )
        .unwrap();
        assert_eq!(parsed.text().as_deref(), Some("## Brief\nAll good."));
    }

    #[test]
    fn test_response_without_text() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(parsed.text().is_none());
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(parsed.text().is_none());
    }
}
