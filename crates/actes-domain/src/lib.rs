//! Actes Domain Layer
//!
//! Core value types and trait interfaces for the death-certificate extraction
//! pipeline. Everything that talks to the outside world (OCR, LLM, artifact
//! storage, tabular stores) is described here as a trait and implemented in
//! other crates.
//!
//! ## Key Concepts
//!
//! - **ExtractedFields**: raw per-page payload returned by the extraction oracle
//! - **DirectoryEntry**: one normalized row of the reference directory
//! - **ContactResult**: best-effort phone/email pair for a record
//! - **OutputRecord**: the final, contact-enriched row for one page image
//! - **Normalized key**: accent-stripped, punctuation-stripped, lower-cased text
//!
//! ## Architecture
//!
//! - Pure business logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod directory;
pub mod error;
pub mod normalize;
pub mod page;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use directory::DirectoryEntry;
pub use error::{CollaboratorError, CollaboratorKind};
pub use normalize::normalize;
pub use page::{compare_by_page_index, page_index, sort_by_page_index};
pub use record::{ContactResult, ExtractedFields, OutputRecord, RecordStatus, OUTPUT_COLUMNS};
pub use traits::{
    ExtractionOracle, Row, StoragePublisher, TabularStore, TextRecognizer, LEDGER_COLUMNS,
};
