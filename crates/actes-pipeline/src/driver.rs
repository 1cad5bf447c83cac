//! Pipeline driver: a batch of page images to ordered output records

use crate::builder::RecordBuilder;
use crate::call::call_blocking;
use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::dedup::DedupIndex;
use crate::directory::ReferenceDirectory;
use crate::error::PipelineError;
use crate::resolver::ContactResolver;
use actes_domain::{
    compare_by_page_index, CollaboratorKind, ExtractionOracle, OutputRecord, Row,
    StoragePublisher, TabularStore, TextRecognizer, OUTPUT_COLUMNS,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// External collaborators used by a run
#[derive(Clone)]
pub struct Collaborators {
    /// OCR over page images
    pub recognizer: Arc<dyn TextRecognizer>,
    /// Structured field extraction
    pub oracle: Arc<dyn ExtractionOracle>,
    /// Artifact storage for page images
    pub publisher: Arc<dyn StoragePublisher>,
    /// Reference directory, image ledger and records tables
    pub store: Arc<dyn TabularStore>,
}

/// An image that produced no record
#[derive(Debug)]
pub struct SkippedImage {
    /// Image path
    pub image: PathBuf,
    /// Why it was skipped
    pub error: PipelineError,
}

/// Result of a batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Records in page order
    pub records: Vec<OutputRecord>,
    /// Images that were skipped, in page order
    pub skipped: Vec<SkippedImage>,
}

/// Drives a batch through OCR, extraction and record building, one image at
/// a time
pub struct PipelineDriver {
    recognizer: Arc<dyn TextRecognizer>,
    oracle: Arc<dyn ExtractionOracle>,
    store: Arc<dyn TabularStore>,
    builder: RecordBuilder,
    config: Arc<PipelineConfig>,
}

impl PipelineDriver {
    /// Create a driver; fails if the configuration is invalid
    pub fn new(collaborators: Collaborators, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        let config = Arc::new(config);

        Ok(Self {
            builder: RecordBuilder::new(
                collaborators.publisher,
                Arc::clone(&collaborators.store),
                Arc::clone(&config),
            ),
            recognizer: collaborators.recognizer,
            oracle: collaborators.oracle,
            store: collaborators.store,
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the reference directory and seed the dedup index
    ///
    /// Any failure here aborts the run before an image is touched.
    pub async fn prepare(&self) -> Result<RunContext, PipelineError> {
        let limit = self.config.call_timeout();

        let directory = Arc::new(ReferenceDirectory::new(
            Arc::clone(&self.store),
            self.config.directory_table.clone(),
        ));
        let loading = Arc::clone(&directory);
        let entries = call_blocking(CollaboratorKind::Store, limit, move || loading.load())
            .await
            .map_err(|e| match e {
                PipelineError::DirectoryUnavailable(_) => e,
                other => PipelineError::DirectoryUnavailable(other.to_string()),
            })?;

        let store = Arc::clone(&self.store);
        let table = self.config.image_ledger_table.clone();
        let existing = call_blocking(CollaboratorKind::Store, limit, move || {
            store.list_existing(&table)
        })
        .await?;

        let dedup = DedupIndex::seeded(existing);
        info!(published = dedup.len(), "dedup index seeded");

        Ok(RunContext::new(directory, ContactResolver::new(entries), dedup))
    }

    /// Process a batch with a fresh run context
    pub async fn run<P: AsRef<Path>>(&self, images: &[P]) -> Result<BatchOutcome, PipelineError> {
        let mut ctx = self.prepare().await?;
        Ok(self.run_with(&mut ctx, images).await)
    }

    /// Process a batch in page order with an existing run context
    ///
    /// Per-image failures are logged and collected; they never stop the batch.
    pub async fn run_with<P: AsRef<Path>>(&self, ctx: &mut RunContext, images: &[P]) -> BatchOutcome {
        let mut ordered: Vec<PathBuf> = images.iter().map(|p| p.as_ref().to_path_buf()).collect();
        ordered.sort_by(|a, b| compare_by_page_index(&a.to_string_lossy(), &b.to_string_lossy()));

        let batch_start = Instant::now();
        let mut outcome = BatchOutcome::default();

        for image in ordered {
            let start = Instant::now();
            info!(image = %image.display(), "processing image");

            match self.process_image(ctx, &image).await {
                Ok(record) => {
                    info!(
                        image = %image.display(),
                        name = %record.full_name,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "image processed"
                    );
                    outcome.records.push(record);
                }
                Err(error) => {
                    warn!(image = %image.display(), reason = %error, "image skipped");
                    outcome.skipped.push(SkippedImage { image, error });
                }
            }
        }

        info!(
            processed = outcome.records.len(),
            skipped = outcome.skipped.len(),
            elapsed_secs = batch_start.elapsed().as_secs(),
            "batch finished"
        );

        outcome
    }

    async fn process_image(
        &self,
        ctx: &mut RunContext,
        image: &Path,
    ) -> Result<OutputRecord, PipelineError> {
        let limit = self.config.call_timeout();

        let recognizer = Arc::clone(&self.recognizer);
        let path = image.to_path_buf();
        let text = call_blocking(CollaboratorKind::Recognizer, limit, move || {
            recognizer.recognize(&path)
        })
        .await?;

        let oracle = Arc::clone(&self.oracle);
        let fields = call_blocking(CollaboratorKind::Oracle, limit, move || oracle.extract(&text)).await?;

        self.builder.build(image, fields, ctx).await
    }

    /// Write `records` as the records table of `batch`, with `OUTPUT_COLUMNS` headers
    ///
    /// Rows from an earlier export of the same batch are replaced.
    pub async fn export(&self, batch: &str, records: &[OutputRecord]) -> Result<usize, PipelineError> {
        let rows: Vec<Row> = records.iter().map(record_row).collect();
        let count = rows.len();

        let store = Arc::clone(&self.store);
        let table = self.config.batch_records_table(batch);
        let target = table.clone();
        call_blocking(CollaboratorKind::Store, self.config.call_timeout(), move || {
            store.replace_rows(&target, rows)
        })
        .await?;

        info!(table = %table, records = count, "records exported");
        Ok(count)
    }
}

/// Row of the records table for `record`
pub fn record_row(record: &OutputRecord) -> Row {
    Row::from_pairs(OUTPUT_COLUMNS.into_iter().zip(record.cells()))
}

impl BatchOutcome {
    /// Number of images that produced a record
    pub fn processed(&self) -> usize {
        self.records.len()
    }
}
