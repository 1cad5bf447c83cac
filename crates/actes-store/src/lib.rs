//! Actes Storage Layer
//!
//! Local implementations of the storage collaborators:
//!
//! - [`SqliteStore`]: the `TabularStore` trait over SQLite. Holds the
//!   reference directory, the image ledger and exported records as named
//!   tables of rows.
//! - [`ArchivePublisher`]: the `StoragePublisher` trait over a local
//!   directory.
//!
//! # Examples
//!
//! ```
//! use actes_domain::{Row, TabularStore};
//! use actes_store::SqliteStore;
//!
//! let store = SqliteStore::in_memory().unwrap();
//! store.append_row("directory", Row::new().with("Declarant", "Martin")).unwrap();
//! assert_eq!(store.read_all("directory").unwrap().len(), 1);
//! ```

#![warn(missing_docs)]

mod archive;

pub use archive::ArchivePublisher;

use actes_domain::{CollaboratorError, Row, TabularStore};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Cell encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Connection mutex poisoned by a panicking thread
    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for CollaboratorError {
    fn from(e: StoreError) -> Self {
        CollaboratorError::store(e.to_string())
    }
}

/// SQLite-based implementation of [`TabularStore`]
///
/// The connection sits behind a mutex so the store can be shared between
/// the pipeline and blocking worker threads.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at `path`
    ///
    /// Use `:memory:` for an in-memory database.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn()?.execute_batch(schema)?;
        Ok(())
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Rows of `table` in insertion order
    pub fn rows(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT cells FROM table_rows WHERE table_name = ?1 ORDER BY id")?;

        let encoded = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        encoded
            .iter()
            .map(|cells| {
                let pairs: Vec<(String, String)> = serde_json::from_str(cells)?;
                Ok(Row::from_pairs(pairs))
            })
            .collect()
    }

    /// Append `row` to `table`
    pub fn insert(&self, table: &str, row: &Row) -> Result<(), StoreError> {
        let (cells, created_at) = encode_row(table, row)?;

        self.conn()?.execute(
            "INSERT INTO table_rows (table_name, cells, created_at) VALUES (?1, ?2, ?3)",
            params![table, cells, created_at],
        )?;

        debug!(table, cells = row.len(), "row appended");
        Ok(())
    }

    /// Replace the contents of `table` with `rows` in one transaction
    ///
    /// Returns the number of rows removed.
    pub fn replace(&self, table: &str, rows: &[Row]) -> Result<usize, StoreError> {
        let encoded = rows
            .iter()
            .map(|row| encode_row(table, row))
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM table_rows WHERE table_name = ?1", params![table])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO table_rows (table_name, cells, created_at) VALUES (?1, ?2, ?3)",
            )?;
            for (cells, created_at) in &encoded {
                stmt.execute(params![table, cells, created_at])?;
            }
        }
        tx.commit()?;

        debug!(table, removed, inserted = encoded.len(), "table replaced");
        Ok(removed)
    }

    /// Number of rows in `table`
    pub fn count(&self, table: &str) -> Result<usize, StoreError> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM table_rows WHERE table_name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Names of all non-empty tables
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT table_name FROM table_rows ORDER BY table_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Append every object of a JSON array to `table`
    ///
    /// Object keys become column names in source order; scalar values are
    /// stored as text and `null` as an empty cell. Returns the number of rows
    /// imported.
    pub fn import_json(&self, table: &str, json: &str) -> Result<usize, StoreError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let items = value
            .as_array()
            .ok_or_else(|| StoreError::InvalidData("expected a JSON array of objects".to_string()))?;

        let mut rows = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or_else(|| StoreError::InvalidData(format!("item {} is not an object", idx)))?;

            let row = obj.iter().try_fold(Row::new(), |row, (column, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::Bool(_) | serde_json::Value::Number(_) => value.to_string(),
                    _ => {
                        return Err(StoreError::InvalidData(format!(
                            "item {} column '{}' is not a scalar",
                            idx, column
                        )))
                    }
                };
                Ok(row.with(column.as_str(), text))
            })?;
            rows.push(row);
        }

        for row in &rows {
            self.insert(table, row)?;
        }

        Ok(rows.len())
    }
}

impl TabularStore for SqliteStore {
    fn read_all(&self, table: &str) -> Result<Vec<Row>, CollaboratorError> {
        Ok(self.rows(table)?)
    }

    fn append_row(&self, table: &str, row: Row) -> Result<(), CollaboratorError> {
        Ok(self.insert(table, &row)?)
    }

    fn replace_rows(&self, table: &str, rows: Vec<Row>) -> Result<(), CollaboratorError> {
        self.replace(table, &rows)?;
        Ok(())
    }
}

/// Cells of `row` as JSON pairs, with the insert timestamp
fn encode_row(table: &str, row: &Row) -> Result<(String, i64), StoreError> {
    if table.trim().is_empty() {
        return Err(StoreError::InvalidData("table name is empty".to_string()));
    }

    let pairs: Vec<(&str, &str)> = row.cells().collect();
    let cells = serde_json::to_string(&pairs)?;
    let created_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok((cells, created_at))
}
