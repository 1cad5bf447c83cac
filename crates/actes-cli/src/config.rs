//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use actes_extractor::ExtractorConfig;
use actes_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Where data is kept
    #[serde(default)]
    pub storage: StorageConfig,

    /// Extraction oracle backend
    #[serde(default)]
    pub llm: LlmConfig,

    /// OCR and extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Pipeline tables and timeouts
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

/// Data locations; unset paths live under the configuration directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database holding the tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Directory receiving published page images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_dir: Option<PathBuf>,

    /// Directory receiving batch export files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

/// LLM backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions API
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// LLM backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Backend kind
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (provider default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".actes"))
    }

    /// Load configuration from `path`, writing the defaults there if missing.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check the nested pipeline and extractor settings.
    pub fn validate(&self) -> Result<()> {
        self.extractor.validate().map_err(CliError::Config)?;
        self.pipeline.validate().map_err(CliError::Config)?;
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("llm.model must not be empty".into()));
        }
        Ok(())
    }

    /// SQLite database path.
    pub fn database_path(&self) -> Result<PathBuf> {
        self.storage_path(&self.storage.database, "actes.db")
    }

    /// Archive directory for published images.
    pub fn archive_dir(&self) -> Result<PathBuf> {
        self.storage_path(&self.storage.archive_dir, "archive")
    }

    /// Directory for batch export files.
    pub fn export_dir(&self) -> Result<PathBuf> {
        self.storage_path(&self.storage.export_dir, "exports")
    }

    fn storage_path(&self, configured: &Option<PathBuf>, default_name: &str) -> Result<PathBuf> {
        match configured {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::home()?.join(default_name)),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: None,
            max_retries: default_max_retries(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_provider() -> ProviderKind {
    ProviderKind::OpenAi
}

fn default_model() -> String {
    actes_llm::openai::DEFAULT_MODEL.to_string()
}

fn default_max_retries() -> u32 {
    3
}
