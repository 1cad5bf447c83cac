//! Error types for the Pipeline

use actes_domain::{CollaboratorError, CollaboratorKind};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building records
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The oracle returned no usable name for the deceased
    #[error("Incomplete extraction: no name found")]
    IncompleteExtraction,

    /// A collaborator failed after its own retries
    #[error("{collaborator} unavailable: {message}")]
    CollaboratorUnavailable {
        /// Collaborator that failed
        collaborator: CollaboratorKind,
        /// Reason reported by the collaborator
        message: String,
    },

    /// The reference directory could not be loaded
    #[error("Reference directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// A collaborator call did not finish in time
    #[error("{collaborator} call timed out after {secs}s")]
    Timeout {
        /// Collaborator that was called
        collaborator: CollaboratorKind,
        /// Configured limit
        secs: u64,
    },

    /// Page image could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Image path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CollaboratorError> for PipelineError {
    fn from(e: CollaboratorError) -> Self {
        PipelineError::CollaboratorUnavailable {
            collaborator: e.kind,
            message: e.message,
        }
    }
}
