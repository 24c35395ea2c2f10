//! HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
//!
//! Each call is a single attempt bounded by the per-request timeout carried in
//! [`CompletionRequest`]. No retries: callers fall back locally on any error.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Url};
use salesdesk_core::AppConfig;
use serde::{Deserialize, Serialize};

use crate::credential::credential_looks_valid;
use crate::error::GenerationError;

/// Longest error body kept in [`GenerationError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// A single prompt plus its token and time budget.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature: None,
            timeout,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Anything that turns a prompt into free text.
///
/// Object-safe so engines can hold an `Arc<dyn TextGenerator>` and tests can
/// substitute a canned generator.
pub trait TextGenerator: Send + Sync {
    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, GenerationError>>;
}

/// Chat-completions client.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GenerationError::InvalidBaseUrl`] if the
    /// endpoint URL does not parse.
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("salesdesk/0.1 (sales-analytics)")
            .build()?;

        let raw = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|e| GenerationError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint,
        })
    }

    /// Builds a client from application config, or `None` when the configured
    /// key is absent or does not look like a key. In that case the remote path
    /// is never attempted.
    ///
    /// # Errors
    ///
    /// Propagates construction errors from [`OpenAiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, GenerationError> {
        let key = config.openai_api_key.as_deref();
        let Some(key) = key.filter(|k| credential_looks_valid(Some(k))) else {
            tracing::info!(
                key_present = key.is_some(),
                "text-generation credential unavailable; remote generation disabled"
            );
            return Ok(None);
        };
        Self::new(key, &config.openai_model, &config.openai_base_url).map(Some)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Deserialize {
                context: "chat completion".to_string(),
                source: e,
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        tracing::debug!(
            model = %self.model,
            chars = content.len(),
            "text generation completed"
        );
        Ok(content)
    }
}

impl TextGenerator for OpenAiClient {
    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> BoxFuture<'a, Result<String, GenerationError>> {
        self.send(request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use salesdesk_core::Environment;

    use super::*;

    fn config_with_key(key: Option<&str>) -> AppConfig {
        AppConfig {
            env: Environment::Test,
            log_level: "info".to_string(),
            data_path: PathBuf::from("fixture.json"),
            openai_api_key: key.map(str::to_string),
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            llm_timeout_secs: 10,
            llm_long_timeout_secs: 15,
            sender_name: "The Sales Team".to_string(),
        }
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = OpenAiClient::new("sk-test", "gpt-4o-mini", "https://api.openai.com/v1/")
            .expect("client construction should not fail");
        assert_eq!(
            client.endpoint.as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = OpenAiClient::new("sk-test", "gpt-4o-mini", "not a url");
        assert!(matches!(result, Err(GenerationError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn from_config_skips_missing_key() {
        let client = OpenAiClient::from_config(&config_with_key(None)).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn from_config_skips_malformed_key() {
        let client = OpenAiClient::from_config(&config_with_key(Some("placeholder"))).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn from_config_builds_with_valid_key() {
        let client = OpenAiClient::from_config(&config_with_key(Some("sk-live-1")))
            .unwrap()
            .expect("client expected");
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn chat_request_omits_missing_temperature() {
        let body = ChatRequest {
            model: "m",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 10,
            temperature: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
