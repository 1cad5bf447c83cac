//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] actes_store::StoreError),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] actes_pipeline::PipelineError),

    /// LLM provider setup error
    #[error("LLM error: {0}")]
    Llm(#[from] actes_llm::LlmError),

    /// OCR or extraction setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] actes_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
