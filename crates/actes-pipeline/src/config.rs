//! Configuration for the Pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tables, naming and timeouts used by a pipeline run
///
/// # Examples
///
/// ```
/// use actes_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.display_name("jean DUPONT"), "Acte de décès - jean DUPONT.png");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Table holding the reference directory (Declarant, Address, Phone, Email)
    pub directory_table: String,

    /// Table of `(display name, reference)` pairs for published images
    pub image_ledger_table: String,

    /// Prefix of the per-batch tables receiving exported records
    pub records_table: String,

    /// Limit for a single collaborator call (seconds)
    pub call_timeout_secs: u64,

    /// Prefix of the published image name
    pub display_prefix: String,

    /// Extension appended to the published image name
    pub display_extension: String,
}

impl PipelineConfig {
    /// Collaborator call limit as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Name under which the image of `full_name`'s certificate is published
    pub fn display_name(&self, full_name: &str) -> String {
        format!("{}{}{}", self.display_prefix, full_name.trim(), self.display_extension)
    }

    /// Table holding the exported records of `batch`
    pub fn batch_records_table(&self, batch: &str) -> String {
        match batch.trim() {
            "" => self.records_table.clone(),
            batch => format!("{}/{}", self.records_table, batch),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("directory_table", &self.directory_table),
            ("image_ledger_table", &self.image_ledger_table),
            ("records_table", &self.records_table),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", field));
            }
        }
        if self.image_ledger_table == self.records_table {
            return Err("image_ledger_table and records_table must differ".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
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

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            directory_table: "directory".to_string(),
            image_ledger_table: "images".to_string(),
            records_table: "records".to_string(),
            call_timeout_secs: 120,
            display_prefix: "Acte de décès - ".to_string(),
            display_extension: ".png".to_string(),
        }
    }
}
