use reqwest::Url;
use serde::Deserialize;
use serde_json::{Value, json};

use groflow_types::ApiKey;

use crate::{
    DEFAULT_GEMINI_MODEL, GEMINI_API_BASE_URL, GenerationError, error_for_status, http_client,
};

const API_VERSION: &str = "v1beta";
const GENERATE_CONTENT_METHOD: &str = "generateContent";
/// Upper bound on `models.list` pages followed in one call.
const MAX_MODEL_PAGES: usize = 20;

/// Where to send generation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: GEMINI_API_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

/// One entry from `models.list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    #[must_use]
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT_METHOD)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    fn into_text(self) -> Result<String, GenerationError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| GenerationError::Upstream {
                status: 200,
                body: match block_reason {
                    Some(reason) => format!("prompt was blocked: {reason}"),
                    None => "response contained no candidate text".to_string(),
                },
            })
    }
}

pub(crate) fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": prompt }]
        }]
    })
}

/// Stateless client for one Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base: Url,
    model: String,
}

impl GeminiClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GenerationError> {
        let trimmed = config.base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed)
            .map_err(|_| GenerationError::InvalidEndpoint(config.base_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(GenerationError::InvalidEndpoint(config.base_url));
        }
        let model = config.model.trim();
        let model = model.strip_prefix("models/").unwrap_or(model);
        if model.is_empty() {
            return Err(GenerationError::InvalidEndpoint(config.base_url));
        }
        Ok(Self {
            http: http_client(trimmed)?,
            base,
            model: model.to_string(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, path: &str, key: &ApiKey) -> Url {
        let mut url = self.base.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}/{API_VERSION}/{path}"));
        url.query_pairs_mut().append_pair("key", key.expose_secret());
        url
    }

    /// Send one prompt and return the generated text.
    ///
    /// A single request is made. A 400 is reported as an invalid credential
    /// and a 429 as rate limiting; neither is retried.
    pub async fn generate(&self, prompt: &str, key: &ApiKey) -> Result<String, GenerationError> {
        let url = self.endpoint(
            &format!("models/{}:{GENERATE_CONTENT_METHOD}", self.model),
            key,
        );
        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "Sending generateContent request"
        );

        let response = self
            .http
            .post(url)
            .json(&build_request_body(prompt))
            .send()
            .await
            .map_err(GenerationError::connection)?;

        if !response.status().is_success() {
            let err = error_for_status(response).await;
            tracing::warn!(model = %self.model, error = %err, "Generation request failed");
            return Err(err);
        }

        let raw = response.text().await.map_err(GenerationError::connection)?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|e| GenerationError::Upstream {
                status: 200,
                body: format!("unreadable response body: {e}"),
            })?;
        let text = parsed.into_text()?;
        tracing::info!(
            model = %self.model,
            reply_chars = text.chars().count(),
            "Generation succeeded"
        );
        Ok(text)
    }

    /// Names of the models that accept `generateContent`, in listing order.
    pub async fn list_models(&self, key: &ApiKey) -> Result<Vec<ModelInfo>, GenerationError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_MODEL_PAGES {
            let mut url = self.endpoint("models", key);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(GenerationError::connection)?;
            if !response.status().is_success() {
                return Err(error_for_status(response).await);
            }

            let page: ListModelsResponse = response
                .json()
                .await
                .map_err(|e| GenerationError::Upstream {
                    status: 200,
                    body: format!("unreadable model list: {}", e.without_url()),
                })?;
            models.extend(
                page.models
                    .into_iter()
                    .filter(ModelInfo::supports_generate_content),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = models.len(), "Listed generateContent models");
        Ok(models)
    }
}
