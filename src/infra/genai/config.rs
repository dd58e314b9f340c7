use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Settings for the narrative text generator, read from the environment:
///
/// | Variable                | Default                    |
/// |-------------------------|----------------------------|
/// | `NARRATIVE_API_KEY`     | none (brief is skipped)    |
/// | `NARRATIVE_MODEL`       | [`DEFAULT_MODEL`]          |
/// | `NARRATIVE_BASE_URL`    | [`DEFAULT_BASE_URL`]       |
/// | `NARRATIVE_TEMPERATURE` | [`DEFAULT_TEMPERATURE`]    |
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl NarrativeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let temperature = match get("NARRATIVE_TEMPERATURE") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("NARRATIVE_TEMPERATURE is not a number: '{raw}'"))?,
            None => DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            api_key: get("NARRATIVE_API_KEY"),
            model: get("NARRATIVE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("NARRATIVE_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            temperature,
        })
    }
}
