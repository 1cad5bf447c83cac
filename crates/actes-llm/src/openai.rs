//! OpenAI-compatible Provider Implementation
//!
//! Talks to any endpoint implementing the `/chat/completions` API (OpenAI,
//! Azure-style gateways, local proxies).
//!
//! # Features
//!
//! - JSON-object response mode for structured extraction
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff on transient failures
//! - Timeout handling
//!
//! Requests are blocking; callers running inside an async runtime should
//! invoke the provider from a blocking worker thread.

use crate::{backoff_delay, LlmError};
use actes_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Chat completions provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "https://api.openai.com/v1")
    /// - `model`: Model to use (e.g., "gpt-4o-mini")
    /// - `api_key`: Bearer token
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new provider with a specific request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Model name used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str, json_mode: bool) -> Result<String, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::Authentication("API key is empty".to_string()));
        }

        let url = format!("{}/chat/completions", self.endpoint);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed: ChatResponse = response.json().map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        return parsed
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|choice| choice.message.content)
                            .ok_or_else(|| {
                                LlmError::InvalidResponse("Response has no content".to_string())
                            });
                    } else if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(LlmError::Authentication(format!("HTTP {}", status)));
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = backoff_delay(attempts);
                warn!(attempt = attempts, ?delay, "chat completion failed, retrying");
                std::thread::sleep(delay);
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        debug!(model = %self.model, prompt_len = prompt.len(), "chat completion");
        self.complete(prompt, false)
    }

    fn generate_json(&self, prompt: &str) -> Result<String, Self::Error> {
        debug!(model = %self.model, prompt_len = prompt.len(), "json chat completion");
        self.complete(prompt, true)
    }
}
