//! Actes Extractor
//!
//! Turns a scanned death-certificate page into structured fields.
//!
//! # Architecture
//!
//! ```text
//! Page image → TesseractRecognizer → text → PromptBuilder → LLM → parser → ExtractedFields
//! ```
//!
//! The LLM is treated as an untrusted oracle: its JSON is read by explicit
//! key lookup and every missing or blank key becomes an absent field.
//!
//! # Example Usage
//!
//! ```
//! use actes_domain::ExtractionOracle;
//! use actes_extractor::{ExtractorConfig, FieldExtractor};
//! use actes_llm::MockProvider;
//!
//! let llm = MockProvider::new(r#"{
//!     "dead person full name": "jean DUPONT",
//!     "Date of death": "03/04/2024",
//!     "declarant name": "Pompes Funèbres Martin",
//!     "declarant City": "Lyon",
//!     "declarant street address": "12 rue Neuve"
//! }"#);
//! let extractor = FieldExtractor::new(llm, ExtractorConfig::default());
//!
//! let fields = extractor.extract("Acte de décès ... Déclarant: ...").unwrap();
//! assert_eq!(fields.full_name.as_deref(), Some("jean DUPONT"));
//! assert_eq!(fields.city.as_deref(), Some("Lyon"));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod ocr;
mod parser;
mod prompt;


pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::FieldExtractor;
pub use ocr::TesseractRecognizer;
pub use parser::parse_llm_response;
pub use prompt::PromptBuilder;
