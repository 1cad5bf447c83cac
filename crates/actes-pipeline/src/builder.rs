//! Record builder: one extracted page to one output row

use crate::call::call_blocking;
use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::error::PipelineError;
use actes_domain::{
    CollaboratorKind, ExtractedFields, OutputRecord, RecordStatus, Row, StoragePublisher,
    TabularStore, LEDGER_COLUMNS,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns extracted fields into an [`OutputRecord`]
///
/// Resolves the contact through the fallback chain, then reuses the
/// reference of an already published image or publishes this one and adds
/// it to the image ledger.
pub struct RecordBuilder {
    publisher: Arc<dyn StoragePublisher>,
    store: Arc<dyn TabularStore>,
    config: Arc<PipelineConfig>,
}

impl RecordBuilder {
    /// Create a new record builder
    pub fn new(
        publisher: Arc<dyn StoragePublisher>,
        store: Arc<dyn TabularStore>,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            publisher,
            store,
            config,
        }
    }

    /// Build the record for the page image at `image`
    ///
    /// Fails with [`PipelineError::IncompleteExtraction`] when the fields
    /// carry no name; nothing is published in that case.
    pub async fn build(
        &self,
        image: &Path,
        fields: ExtractedFields,
        ctx: &mut RunContext,
    ) -> Result<OutputRecord, PipelineError> {
        let full_name = fields
            .name()
            .ok_or(PipelineError::IncompleteExtraction)?
            .to_string();

        let contact = ctx.resolver().resolve_fields(&fields);

        let existing = ctx.dedup().contains(&full_name).map(str::to_string);
        let image_reference = match existing {
            Some(reference) => {
                debug!(name = %full_name, reference = %reference, "image already published");
                reference
            }
            None => self.publish(image, &full_name, ctx).await?,
        };

        Ok(OutputRecord {
            full_name,
            date_of_death: fields.date_of_death,
            declarant_name: fields.declarant_name,
            city: fields.city,
            street: fields.street,
            phone: contact.phone,
            email: contact.email,
            status: RecordStatus::Pending,
            image_reference,
        })
    }

    async fn publish(
        &self,
        image: &Path,
        full_name: &str,
        ctx: &mut RunContext,
    ) -> Result<String, PipelineError> {
        let bytes = tokio::fs::read(image)
            .await
            .map_err(|source| PipelineError::Io {
                path: image.to_path_buf(),
                source,
            })?;

        let display_name = self.config.display_name(full_name);
        let limit = self.config.call_timeout();

        let publisher = Arc::clone(&self.publisher);
        let name = display_name.clone();
        let reference = call_blocking(CollaboratorKind::Publisher, limit, move || {
            publisher.publish(&bytes, &name)
        })
        .await?;

        ctx.dedup_mut().record(&display_name, reference.clone());
        info!(display_name = %display_name, reference = %reference, "image published");

        let store = Arc::clone(&self.store);
        let table = self.config.image_ledger_table.clone();
        let row = Row::new()
            .with(LEDGER_COLUMNS[0], display_name.clone())
            .with(LEDGER_COLUMNS[1], reference.clone());

        if let Err(e) = call_blocking(CollaboratorKind::Store, limit, move || {
            store.append_row(&table, row)
        })
        .await
        {
            // The in-memory index still covers the rest of this run
            warn!(display_name = %display_name, error = %e, "image published but missing from the ledger");
        }

        Ok(reference)
    }
}
