pub mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::models::{ChatMessage, Role};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Language model is not configured")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Language model API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Language model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Language model returned no content")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A single text-completion call: task prompt plus conversation context.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    /// Ask the provider for a JSON object instead of prose.
    pub json_mode: bool,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is required".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn build_body(&self, request: CompletionRequest) -> dto::ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(dto::WireMessage {
            role: Role::System.as_str().to_string(),
            content: Some(request.system),
        });
        messages.extend(request.messages.into_iter().map(|m| dto::WireMessage {
            role: m.role.as_str().to_string(),
            content: Some(m.content),
        }));

        dto::ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_mode
                .then_some(dto::ResponseFormat { kind: "json_object" }),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = self.build_body(request);
        debug!("Sending completion request to {} (model {})", url, body.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let parsed: dto::ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Stand-in when no API key is configured; every call fails softly.
pub struct NoopLlmClient;

#[async_trait]
impl LlmClient for NoopLlmClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }
}

/// Calls the model with a per-attempt timeout and up to `retries` extra attempts.
pub async fn complete_bounded(
    llm: &dyn LlmClient,
    request: CompletionRequest,
    timeout: Duration,
    retries: u32,
) -> Result<String, LlmError> {
    let mut attempt = 0;
    loop {
        let result = match tokio::time::timeout(timeout, llm.complete(request.clone())).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(timeout)),
        };

        match result {
            Ok(text) => return Ok(text),
            Err(LlmError::Disabled) => return Err(LlmError::Disabled),
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!("Language model call failed ({}), retrying ({}/{})", e, attempt, retries);
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
            }
            Err(e) => return Err(e),
        }
    }
}
