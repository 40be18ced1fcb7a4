//! OpenAI provider implementation
//!
//! Talks to the chat completions endpoint of the OpenAI API, or of any
//! service exposing the same wire format behind a custom base URL.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::api_key::Credential;
use crate::error::ProviderError;
use crate::models::{Capability, ChatRequest, ChatResponse, FinishReason, Message, ModelInfo, TokenUsage};
use crate::provider::Provider;

/// Public OpenAI endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Seconds to wait after a 429 when the provider sends no `retry-after`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// OpenAI provider implementation
pub struct OpenAiProvider {
    credential: Credential,
    client: Arc<Client>,
    base_url: String,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance
    pub fn new(credential: Credential) -> Result<Self, ProviderError> {
        Self::with_base_url(credential, OPENAI_BASE_URL.to_string())
    }

    /// Create a new OpenAI provider with a custom base URL
    pub fn with_base_url(credential: Credential, base_url: String) -> Result<Self, ProviderError> {
        if credential.is_blank() {
            return Err(ProviderError::ConfigError(
                "OpenAI API key is required".to_string(),
            ));
        }

        Ok(Self {
            credential,
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Replace the HTTP client with one that gives up after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        self.client = Arc::new(client);
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_auth_header(&self) -> String {
        format!("Bearer {}", self.credential.expose())
    }

    /// Convert OpenAI API response to our ChatResponse
    fn convert_response(
        response: OpenAiChatResponse,
        model: String,
    ) -> Result<ChatResponse, ProviderError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("No choices in response".to_string()))?;

        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| ProviderError::ParseError("No content in response".to_string()))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("error") => FinishReason::Error,
            _ => FinishReason::Stop,
        };

        Ok(ChatResponse {
            content,
            model: response.model.unwrap_or(model),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
        })
    }
}

fn vision_model(id: &str, name: &str, context_window: usize) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        name: name.to_string(),
        provider: "openai".to_string(),
        context_window,
        capabilities: vec![Capability::Chat, Capability::Vision, Capability::JsonMode],
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    fn models(&self) -> Vec<ModelInfo> {
        vec![
            vision_model("gpt-4o", "GPT-4o", 128000),
            vision_model("gpt-4o-mini", "GPT-4o mini", 128000),
            vision_model("gpt-4-turbo", "GPT-4 Turbo", 128000),
            ModelInfo {
                id: "gpt-3.5-turbo".to_string(),
                name: "GPT-3.5 Turbo".to_string(),
                provider: "openai".to_string(),
                context_window: 16385,
                capabilities: vec![Capability::Chat, Capability::JsonMode],
            },
        ]
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let model_id = &request.model;
        if !self.models().iter().any(|m| m.id == *model_id) {
            return Err(ProviderError::InvalidModel(model_id.clone()));
        }
        if request.has_images() && !self.supports_vision(model_id) {
            return Err(ProviderError::InvalidModel(format!(
                "{} does not accept images",
                model_id
            )));
        }

        let openai_request = OpenAiChatRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("Sending chat request to OpenAI for model: {}", request.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", self.get_auth_header())
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                error!("OpenAI API request failed: {}", e);
                ProviderError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error ({}): {}", status, error_text);

            return match status.as_u16() {
                401 | 403 => Err(ProviderError::AuthError),
                429 => Err(ProviderError::RateLimited(
                    retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
                )),
                _ => Err(ProviderError::ProviderError(format!(
                    "OpenAI API error: {}",
                    status
                ))),
            };
        }

        let body = response.text().await?;
        let openai_response: OpenAiChatResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Malformed OpenAI response envelope: {}", e);
            ProviderError::ParseError(format!("Malformed response envelope: {}", e))
        })?;

        Self::convert_response(openai_response, request.model)
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        debug!("Performing health check for OpenAI provider");

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", self.get_auth_header())
            .send()
            .await
            .map_err(|e| {
                warn!("OpenAI health check failed: {}", e);
                ProviderError::from(e)
            })?;

        match response.status().as_u16() {
            200 => {
                debug!("OpenAI health check passed");
                Ok(true)
            }
            401 | 403 => {
                error!("OpenAI health check failed: authentication error");
                Err(ProviderError::AuthError)
            }
            _ => {
                warn!(
                    "OpenAI health check failed with status: {}",
                    response.status()
                );
                Ok(false)
            }
        }
    }
}

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}
