//! OCR through the Tesseract command-line tool

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use actes_domain::{CollaboratorError, TextRecognizer};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Text recognizer that shells out to `tesseract`
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl TesseractRecognizer {
    /// Create a recognizer using `command` and the `language` pack
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    /// Create a recognizer from the extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(&config.tesseract_command, &config.ocr_language)
    }

    /// Check that the executable runs and has the configured language pack
    pub fn check_available(&self) -> Result<(), ExtractorError> {
        let output = Command::new(&self.command)
            .arg("--list-langs")
            .output()
            .map_err(|e| {
                ExtractorError::Ocr(format!("{} is not installed: {}", self.command, e))
            })?;

        if !output.status.success() {
            return Err(ExtractorError::Ocr(format!(
                "{} --list-langs exited with {}",
                self.command, output.status
            )));
        }

        // Older releases print the list on stderr
        let listing = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if has_language(&listing, &self.language) {
            Ok(())
        } else {
            Err(ExtractorError::Ocr(format!(
                "language pack '{}' is not installed",
                self.language
            )))
        }
    }

    /// Recognize the text of one image
    pub fn recognize_text(&self, image_path: &Path) -> Result<String, ExtractorError> {
        debug!(image = %image_path.display(), "running tesseract");

        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| ExtractorError::Ocr(format!("failed to run {}: {}", self.command, e)))?;

        if !output.status.success() {
            return Err(ExtractorError::Ocr(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image_path: &Path) -> Result<String, CollaboratorError> {
        self.recognize_text(image_path).map_err(CollaboratorError::from)
    }
}

fn has_language(listing: &str, language: &str) -> bool {
    listing.lines().any(|line| line.trim() == language)
}
