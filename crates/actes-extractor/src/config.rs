//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Configuration for field extraction and OCR
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum recognized text length sent to the LLM (characters)
    pub max_text_length: usize,

    /// Model name recorded in logs
    pub model_name: String,

    /// Tesseract executable
    pub tesseract_command: String,

    /// Tesseract language pack
    pub ocr_language: String,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.tesseract_command.trim().is_empty() {
            return Err("tesseract_command must not be empty".to_string());
        }
        if self.ocr_language.trim().is_empty() {
            return Err("ocr_language must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: 20_000,
            model_name: "llm".to_string(),
            tesseract_command: "tesseract".to_string(),
            ocr_language: "fra".to_string(),
        }
    }
}
