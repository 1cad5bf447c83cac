//! Actes LLM Provider Layer
//!
//! Pluggable LLM provider implementations of the `LlmProvider` trait from
//! `actes-domain`. The extractor only needs "prompt in, JSON text out", so
//! every provider exposes a plain and a JSON-constrained completion.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use actes_llm::MockProvider;
//! use actes_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new(r#"{"dead person full name": ""}"#);
//! let result = provider.generate_json("test prompt").unwrap();
//! assert!(result.starts_with('{'));
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;

use actes_domain::traits::LlmProvider as LlmProviderTrait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Exponential backoff delay before retry number `attempt` (1-based): 1s, 2s, 4s, ...
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt.saturating_sub(1).min(6)))
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls. A
/// configured response is used when the prompt contains its key fragment;
/// otherwise the default response is returned.
///
/// # Examples
///
/// ```
/// use actes_llm::MockProvider;
/// use actes_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::new("{}");
/// provider.add_response("page one", r#"{"a": 1}"#);
/// assert_eq!(provider.generate("Text:\npage one\n").unwrap(), r#"{"a": 1}"#);
/// assert_eq!(provider.generate("Text:\npage two\n").unwrap(), "{}");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, MockReply)>>>,
    call_count: Arc<Mutex<usize>>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Answer `response` to any prompt containing `fragment`
    ///
    /// Fragments are checked in the order they were added.
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.into(), MockReply::Text(response.into())));
    }

    /// Fail any prompt containing `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.into(), MockReply::Error));
    }

    /// Get the number of times a completion was requested
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        let responses = self.responses.lock().unwrap();
        match responses.iter().find(|(fragment, _)| prompt.contains(fragment.as_str())) {
            Some((_, MockReply::Text(response))) => Ok(response.clone()),
            Some((_, MockReply::Error)) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }

    fn generate_json(&self, prompt: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }
}
