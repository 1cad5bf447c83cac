//! Core FieldExtractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use actes_domain::traits::LlmProvider;
use actes_domain::{CollaboratorError, ExtractedFields, ExtractionOracle};
use std::time::Instant;
use tracing::{debug, info};

/// Extraction oracle backed by an LLM
pub struct FieldExtractor<L>
where
    L: LlmProvider,
{
    llm_provider: L,
    config: ExtractorConfig,
}

impl<L> FieldExtractor<L>
where
    L: LlmProvider,
    L::Error: std::fmt::Display,
{
    /// Create a new FieldExtractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Extract certificate fields from recognized page text
    pub fn extract_fields(&self, text: &str) -> Result<ExtractedFields, ExtractorError> {
        let text = text.trim();

        if text.is_empty() {
            return Err(ExtractorError::EmptyText);
        }

        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }

        let start = Instant::now();
        let prompt = PromptBuilder::new(text).build();

        debug!("Prompt length: {} chars", prompt.len());

        let response = self
            .llm_provider
            .generate_json(&prompt)
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        debug!("LLM response length: {} chars", response.len());

        let fields = parse_llm_response(&response)?;

        info!(
            model = %self.config.model_name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extracted certificate fields"
        );

        Ok(fields)
    }
}

impl<L> ExtractionOracle for FieldExtractor<L>
where
    L: LlmProvider + Send + Sync,
    L::Error: std::fmt::Display,
{
    fn extract(&self, raw_text: &str) -> Result<ExtractedFields, CollaboratorError> {
        self.extract_fields(raw_text).map_err(CollaboratorError::from)
    }
}
