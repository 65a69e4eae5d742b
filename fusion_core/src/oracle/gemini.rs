//! Gemini `generateContent` oracle.

use alchemy_rules::Element;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{fusion_prompt, fusion_response_schema, FusionResult, Oracle, OracleError};
use crate::config::OracleConfig;

/// Error bodies longer than this are cut before they reach logs.
const MAX_ERROR_BODY_CHARS: usize = 2048;

/// Fusion oracle backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiOracle {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiOracle {
    /// Build an oracle from config, resolving the API key from config or environment.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        Self::from_config_with_key(config, config.resolve_api_key())
    }

    /// Build an oracle from config with an already resolved API key.
    pub fn from_config_with_key(
        config: &OracleConfig,
        api_key: Option<String>,
    ) -> Result<Self, OracleError> {
        let api_key = api_key.ok_or(OracleError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self::with_client(
            client,
            config.api_base.clone(),
            config.model.clone(),
            api_key,
        ))
    }

    pub fn with_client(
        client: reqwest::Client,
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

impl std::fmt::Debug for GeminiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiOracle")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Oracle for GeminiOracle {
    async fn fuse(&self, first: &Element, second: &Element) -> Result<FusionResult, OracleError> {
        let body = request_body(first, second);

        tracing::debug!(model = %self.model, %first, %second, "requesting fusion");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        parse_response(&text)
    }
}

/// Build the `generateContent` request body.
pub fn request_body(first: &Element, second: &Element) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": fusion_prompt(first, second) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": fusion_response_schema()
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Extract the fusion result from a raw `generateContent` response body.
pub fn parse_response(body: &str) -> Result<FusionResult, OracleError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    let result: FusionResult =
        serde_json::from_str(&text).map_err(|e| OracleError::Malformed(e.to_string()))?;

    if result.name.trim().is_empty() || result.emoji.trim().is_empty() {
        return Err(OracleError::Malformed(
            "result has a blank name or emoji".to_string(),
        ));
    }

    Ok(result)
}
