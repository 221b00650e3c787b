/// LLM Client: the single point of entry for all completion calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through the `Completer` trait.
///
/// Two interchangeable backends: the hosted OpenAI chat-completions API and
/// a local Ollama server. One request, one response; no streaming, no retries.
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;
#[cfg(test)]
pub mod stub;

// ────────────────────────────────────────────────────────────────────────────
// Provider selection
// ────────────────────────────────────────────────────────────────────────────

/// Closed set of completion backends. Adding one is a compile-checked change
/// to every `match` below.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
        }
    }

    /// Human-facing name used in connectivity prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Ollama => "Ollama",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output caps forwarded to the hosted API. The local server ignores them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl SamplingParams {
    pub const OUTREACH_MESSAGE: SamplingParams = SamplingParams {
        max_tokens: 300,
        temperature: 0.7,
    };
    pub const VIRAL_POST: SamplingParams = SamplingParams {
        max_tokens: 400,
        temperature: 0.8,
    };
    pub const CONNECTIVITY: SamplingParams = SamplingParams {
        max_tokens: 10,
        temperature: 0.0,
    };
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Provider reported an error: {0}")]
    Provider(String),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No API key configured")]
    MissingApiKey,
}

/// The uniform "generation failed" error. Whatever went wrong, callers see
/// the provider and the underlying cause, never partial output.
#[derive(Debug, Error)]
#[error("{provider} generation failed: {cause}")]
pub struct ProviderError {
    pub provider: Provider,
    #[source]
    pub cause: LlmError,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Synchronous-per-call text completion. Carried in `AppState` as `Arc<dyn Completer>`.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        provider: Provider,
        params: SamplingParams,
    ) -> Result<String, ProviderError>;

    /// One-line round trip used by the provider self-test endpoints.
    async fn ping(&self, provider: Provider) -> Result<String, ProviderError> {
        self.complete(
            prompts::CONNECTIVITY_SYSTEM,
            &prompts::connectivity_prompt(provider),
            provider,
            SamplingParams::CONNECTIVITY,
        )
        .await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// HTTP-backed completer holding one pooled `reqwest::Client` for both providers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    openai_api_key: Option<String>,
    openai_base_url: String,
    openai_model: String,
    ollama_base_url: String,
    ollama_model: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            openai_api_key: config.openai_api_key.clone(),
            openai_base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            openai_model: config.openai_model.clone(),
            ollama_base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            ollama_model: config.ollama_model.clone(),
        })
    }

    pub fn openai_model(&self) -> &str {
        &self.openai_model
    }

    pub fn ollama_model(&self) -> &str {
        &self.ollama_model
    }

    async fn complete_openai(
        &self,
        system: &str,
        user: &str,
        params: SamplingParams,
    ) -> Result<String, LlmError> {
        let api_key = self.openai_api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.openai_model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.openai_base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let chat: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

        if let Some(usage) = &chat.usage {
            debug!(
                "OpenAI call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyContent)?;

        non_empty(text)
    }

    async fn complete_ollama(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let prompt = format!("{system}\n\n{user}");
        let request_body = GenerateRequest {
            model: &self.ollama_model,
            prompt: &prompt,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.ollama_base_url))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            let message = serde_json::from_str::<GenerateResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

        if let Some(error) = generated.error {
            return Err(LlmError::Provider(error));
        }

        let text = generated
            .response
            .ok_or_else(|| LlmError::Parse("missing `response` field".to_string()))?;

        non_empty(text)
    }
}

fn non_empty(text: String) -> Result<String, LlmError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(LlmError::EmptyContent)
    } else {
        Ok(trimmed.to_string())
    }
}

#[async_trait]
impl Completer for LlmClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        provider: Provider,
        params: SamplingParams,
    ) -> Result<String, ProviderError> {
        let result = match provider {
            Provider::OpenAi => self.complete_openai(system, user, params).await,
            Provider::Ollama => self.complete_ollama(system, user).await,
        };

        result.map_err(|cause| {
            warn!(provider = %provider, "Completion failed: {cause}");
            ProviderError { provider, cause }
        })
    }
}
