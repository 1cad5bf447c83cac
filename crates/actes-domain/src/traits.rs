//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the outside
//! world. Infrastructure implementations live in other crates; tests inject
//! fakes.

use crate::error::CollaboratorError;
use crate::record::ExtractedFields;
use std::path::Path;

/// One row read from a tabular store, with named columns in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a cell
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.push((column.into(), value.into()));
        self
    }

    /// Value of the first cell whose column matches `column` (case-insensitive)
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(column))
            .map(|(_, value)| value.as_str())
    }

    /// Value of the first column among `columns` that is present
    pub fn get_any(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|column| self.get(column))
    }

    /// Value at a position, regardless of column name
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|(_, value)| value.as_str())
    }

    /// Iterate `(column, value)` pairs in order
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (actes-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate a completion constrained to a JSON object
    fn generate_json(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Optical character recognition over a page image
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text of the image at `image_path`
    fn recognize(&self, image_path: &Path) -> Result<String, CollaboratorError>;
}

/// Turns recognized page text into structured fields
///
/// Implemented by the application layer (actes-extractor). The result is
/// best-effort: any field may be absent.
pub trait ExtractionOracle: Send + Sync {
    /// Extract the certificate fields from raw page text
    fn extract(&self, raw_text: &str) -> Result<ExtractedFields, CollaboratorError>;
}

/// Uploads an artifact and returns an addressable reference
///
/// Not idempotent: avoiding duplicate publishes is the caller's job.
pub trait StoragePublisher: Send + Sync {
    /// Publish `bytes` under `display_name`, returning a link or identifier
    fn publish(&self, bytes: &[u8], display_name: &str) -> Result<String, CollaboratorError>;
}

/// Column headers of the image ledger table
pub const LEDGER_COLUMNS: [&str; 2] = ["Name", "Link"];

/// Named tables of rows
///
/// Backs the reference directory, the image ledger and the exported records.
pub trait TabularStore: Send + Sync {
    /// All rows of `table`, in insertion order
    fn read_all(&self, table: &str) -> Result<Vec<Row>, CollaboratorError>;

    /// Append a row to `table`
    fn append_row(&self, table: &str, row: Row) -> Result<(), CollaboratorError>;

    /// Replace every row of `table` with `rows`
    fn replace_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), CollaboratorError>;

    /// `(name, reference)` pairs of the image ledger in `table`
    ///
    /// Cells are looked up under the [`LEDGER_COLUMNS`] headers. Rows carrying
    /// neither header are read by position; rows missing one of the two
    /// values are skipped.
    fn list_existing(&self, table: &str) -> Result<Vec<(String, String)>, CollaboratorError> {
        Ok(self
            .read_all(table)?
            .iter()
            .filter_map(|row| {
                let [name_column, link_column] = LEDGER_COLUMNS;
                let (name, reference) = match (row.get(name_column), row.get(link_column)) {
                    (Some(name), Some(reference)) => (name, reference),
                    (None, None) => (row.value_at(0)?, row.value_at(1)?),
                    _ => return None,
                };
                Some((name.to_string(), reference.to_string()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup() {
        let row = Row::new()
            .with("Declarant", "Martin")
            .with(" Adresse ", "Lyon")
            .with("Phone", "0102030405");

        assert_eq!(row.get("declarant"), Some("Martin"));
        assert_eq!(row.get_any(&["Address", "Adresse"]), Some("Lyon"));
        assert_eq!(row.get("Email"), None);
        assert_eq!(row.value_at(2), Some("0102030405"));
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_row_from_pairs() {
        let row = Row::from_pairs([("a", "1"), ("b", "2")]);
        let cells: Vec<_> = row.cells().collect();
        assert_eq!(cells, vec![("a", "1"), ("b", "2")]);
    }
}
