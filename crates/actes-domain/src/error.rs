//! Error type shared by all collaborator traits

use std::fmt;

/// Which external collaborator failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollaboratorKind {
    /// Optical character recognition
    Recognizer,
    /// Structured field extraction (LLM)
    Oracle,
    /// Artifact storage
    Publisher,
    /// Tabular store reads and writes
    Store,
}

impl CollaboratorKind {
    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorKind::Recognizer => "recognizer",
            CollaboratorKind::Oracle => "oracle",
            CollaboratorKind::Publisher => "publisher",
            CollaboratorKind::Store => "store",
        }
    }
}

impl fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an external collaborator after its own retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorError {
    /// Collaborator that failed
    pub kind: CollaboratorKind,
    /// Human-readable reason
    pub message: String,
}

impl CollaboratorError {
    /// Create a new collaborator error
    pub fn new(kind: CollaboratorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Recognizer failure
    pub fn recognizer(message: impl Into<String>) -> Self {
        Self::new(CollaboratorKind::Recognizer, message)
    }

    /// Oracle failure
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::new(CollaboratorKind::Oracle, message)
    }

    /// Publisher failure
    pub fn publisher(message: impl Into<String>) -> Self {
        Self::new(CollaboratorKind::Publisher, message)
    }

    /// Store failure
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(CollaboratorKind::Store, message)
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unavailable: {}", self.kind, self.message)
    }
}

impl std::error::Error for CollaboratorError {}
