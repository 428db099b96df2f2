//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` for the Google Generative Language API
//! (`models/{model}:generateContent`). Supports text and inline image parts.
//!
//! One request per call: no retry, no client timeout beyond reqwest's
//! defaults.

use analyst_core::{
    error::{LlmError, Result},
    message::{ContentPart, Message, Role},
    provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";
const ILL_STRUCTURED: &str = "AI response empty or ill-structured";

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API root, without the `/v1beta` suffix
    pub base_url: String,

    /// API credential, sent as a header and never logged
    pub api_key: String,

    /// Default model for requests
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
        }
    }

    /// Read `GEMINI_API_KEY` (required), `GEMINI_MODEL` and `GEMINI_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Config("GEMINI_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key.trim());
        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
        Ok(config)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

// ============================================================================
// Provider
// ============================================================================

/// Gemini LLM provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from configuration
    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.config.base_url, model)
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}", self.config.base_url, model)
    }

    /// Convert messages to Gemini `contents`
    fn convert_messages(messages: &[Message]) -> Vec<Content<'_>> {
        messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                let parts = m
                    .parts
                    .iter()
                    .map(|p| match p {
                        ContentPart::Text { text } => Part::Text { text },
                        ContentPart::InlineData { mime_type, data } => Part::InlineData {
                            inline_data: InlineData { mime_type, data },
                        },
                    })
                    .collect();
                Content { role, parts }
            })
            .collect()
    }

    fn build_request<'a>(messages: &'a [Message], options: &GenerationOptions) -> GenerateContentRequest<'a> {
        let generation_config = (options.temperature.is_some() || options.max_tokens.is_some()).then(|| {
            GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            }
        });

        GenerateContentRequest {
            contents: Self::convert_messages(messages),
            generation_config,
        }
    }

    /// Map a non-success status to an error
    fn status_error(status: StatusCode, body: &str) -> LlmError {
        let snippet: String = body.chars().take(200).collect();
        match status.as_u16() {
            401 | 403 => LlmError::Auth(format!("HTTP {status}")),
            429 => LlmError::RateLimited(format!("HTTP {status}: {snippet}")),
            _ => LlmError::Provider(format!("HTTP {status}: {snippet}")),
        }
    }

    /// Pull the first candidate's first text part out of a response
    fn convert_completion(response: GenerateContentResponse, model: &str) -> Result<Completion> {
        let usage = response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count.unwrap_or(0),
            completion_tokens: u.candidates_token_count.unwrap_or(0),
            total_tokens: u.total_token_count.unwrap_or(0),
        });

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| LlmError::MalformedResponse(ILL_STRUCTURED.into()))?;
        let finish_reason = candidate.finish_reason;

        let content = candidate
            .content
            .and_then(|c| c.parts)
            .and_then(|p| p.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LlmError::MalformedResponse(ILL_STRUCTURED.into()))?;

        Ok(Completion {
            content,
            model: model.to_string(),
            usage,
            finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Gemini".into(),
            model: self.config.model.clone(),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.model_url(&self.config.model))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
        let request = Self::build_request(messages, options);

        let response = self
            .client
            .post(self.generate_url(&options.model))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body));
        }

        let data: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(format!("{ILL_STRUCTURED}: {e}")))?;

        let completion = Self::convert_completion(data, &options.model)?;
        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Gemini usage"
            );
        }
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GeminiProvider {
        let mut config = GeminiConfig::new("test-key");
        config.base_url = server.uri();
        GeminiProvider::from_config(config).unwrap()
    }

    fn options() -> GenerationOptions {
        GenerationOptions::for_model(DEFAULT_MODEL)
    }

    #[test]
    fn test_config_from_lookup() {
        let config = GeminiConfig::from_lookup(|k| match k {
            "GEMINI_API_KEY" => Some(" secret ".into()),
            "GEMINI_BASE_URL" => Some("http://localhost:9000/".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = GeminiConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));

        let err = GeminiConfig::from_lookup(|_| Some("   ".into())).unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));
    }

    #[test]
    fn test_request_body_with_image() {
        let messages = vec![Message::user("Analyze").with_part(ContentPart::png("AAAA"))];
        let body = serde_json::to_value(GeminiProvider::build_request(&messages, &options())).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "Analyze"},
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_assistant_turns_map_to_model_role() {
        let messages = vec![Message::user("Rank BTC"), Message::new(Role::Assistant, "{}")];
        let body = serde_json::to_value(GeminiProvider::build_request(&messages, &options())).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "{}");
    }

    #[test]
    fn test_generation_config_only_when_set() {
        let messages = vec![Message::user("x")];
        let mut opts = options();
        opts.temperature = Some(0.2);

        let body = serde_json::to_value(GeminiProvider::build_request(&messages, &opts)).unwrap();
        assert_eq!(body["generationConfig"], json!({"temperature": 0.2_f32}));
    }

    #[tokio::test]
    async fn test_complete_returns_first_text_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({"contents": [{"role": "user"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "{\"ranked_assets\": []}"}], "role": "model"},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .complete(&[Message::user("Rank")], &options())
            .await
            .unwrap();

        assert_eq!(completion.content, "{\"ranked_assets\": []}");
        assert_eq!(completion.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_non_success_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&[Message::user("Rank")], &options())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Provider(_)));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_missing_text_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{}]}}]
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&[Message::user("Rank")], &options())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&[Message::user("Rank")], &options())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let mut config = GeminiConfig::new("test-key");
        config.base_url = "http://127.0.0.1:1".into();
        let provider = GeminiProvider::from_config(config).unwrap();

        let err = provider
            .complete(&[Message::user("Rank")], &options())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::ProviderUnavailable(_)));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models/gemini-2.0-flash"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "models/gemini-2.0-flash"})))
            .mount(&server)
            .await;

        assert!(provider_for(&server).health_check().await.unwrap());
    }
}
