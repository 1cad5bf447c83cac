//! Error types for the Extractor

use actes_domain::CollaboratorError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// OCR engine error
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Recognized text is empty
    #[error("No text recognized")]
    EmptyText,

    /// LLM response is not the expected JSON object
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<ExtractorError> for CollaboratorError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::Ocr(_) | ExtractorError::EmptyText => {
                CollaboratorError::recognizer(e.to_string())
            }
            _ => CollaboratorError::oracle(e.to_string()),
        }
    }
}
