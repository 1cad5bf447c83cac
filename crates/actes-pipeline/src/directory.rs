//! Reference directory of declarants and their contacts

use crate::error::PipelineError;
use actes_domain::{DirectoryEntry, Row, TabularStore};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

const DECLARANT_COLUMNS: &[&str] = &["Declarant"];
const ADDRESS_COLUMNS: &[&str] = &["Address", "Adresse"];
const PHONE_COLUMNS: &[&str] = &["Phone"];
const EMAIL_COLUMNS: &[&str] = &["Email"];

/// Normalized directory rows, fetched from a tabular store at most once
pub struct ReferenceDirectory {
    store: Arc<dyn TabularStore>,
    table: String,
    entries: OnceLock<Arc<[DirectoryEntry]>>,
}

impl ReferenceDirectory {
    /// Create a directory reading `table` from `store`
    pub fn new(store: Arc<dyn TabularStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            entries: OnceLock::new(),
        }
    }

    /// Entries in source order
    ///
    /// The first successful call reads the store; later calls return the
    /// cached entries. A failed read is not cached.
    pub fn load(&self) -> Result<Arc<[DirectoryEntry]>, PipelineError> {
        if let Some(entries) = self.entries.get() {
            return Ok(Arc::clone(entries));
        }

        let rows = self
            .store
            .read_all(&self.table)
            .map_err(|e| PipelineError::DirectoryUnavailable(e.to_string()))?;

        let total = rows.len();
        let entries: Arc<[DirectoryEntry]> = rows.iter().filter_map(entry_from_row).collect();

        info!(
            table = %self.table,
            entries = entries.len(),
            dropped = total - entries.len(),
            "reference directory loaded"
        );

        Ok(Arc::clone(self.entries.get_or_init(|| entries)))
    }

    /// True once the entries have been fetched
    pub fn is_loaded(&self) -> bool {
        self.entries.get().is_some()
    }
}

fn entry_from_row(row: &Row) -> Option<DirectoryEntry> {
    let declarant = row.get_any(DECLARANT_COLUMNS).unwrap_or_default();
    let address = row.get_any(ADDRESS_COLUMNS).unwrap_or_default();

    let entry = DirectoryEntry::from_source(
        declarant,
        address,
        row.get_any(PHONE_COLUMNS),
        row.get_any(EMAIL_COLUMNS),
    );

    if entry.is_none() {
        debug!(declarant, address, "dropping directory row without keys");
    }
    entry
}
