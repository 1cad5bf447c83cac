//! Actes Pipeline
//!
//! Turns a batch of death-certificate page images into contact-enriched
//! output records.
//!
//! ## Per-image flow
//!
//! 1. OCR the page ([`actes_domain::TextRecognizer`])
//! 2. Extract the fields ([`actes_domain::ExtractionOracle`])
//! 3. Resolve a contact: declarant, then street, then city ([`ContactResolver`])
//! 4. Reuse or publish the page image ([`DedupIndex`], [`actes_domain::StoragePublisher`])
//! 5. Assemble the pending [`actes_domain::OutputRecord`]
//!
//! Images are processed one at a time in page order. A failing image is
//! logged and skipped; a reference directory that cannot be loaded aborts
//! the run before any image.
//!
//! # Examples
//!
//! ```no_run
//! use actes_pipeline::{Collaborators, PipelineConfig, PipelineDriver};
//!
//! # async fn example(collaborators: Collaborators) -> Result<(), Box<dyn std::error::Error>> {
//! let driver = PipelineDriver::new(collaborators, PipelineConfig::default())?;
//! let outcome = driver.run(&["page-2.png", "page-1.png"]).await?;
//! driver.export("mars", &outcome.records).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
mod call;
mod config;
mod context;
mod dedup;
mod directory;
mod driver;
mod error;
mod resolver;

pub use builder::RecordBuilder;
pub use config::PipelineConfig;
pub use context::RunContext;
pub use dedup::DedupIndex;
pub use directory::ReferenceDirectory;
pub use driver::{record_row, BatchOutcome, Collaborators, PipelineDriver, SkippedImage};
pub use error::PipelineError;
pub use resolver::{ContactResolver, LookupOutcome, ResolutionStrategy};
