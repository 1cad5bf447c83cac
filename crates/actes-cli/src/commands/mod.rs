//! Command implementations.

pub mod config;
pub mod run;
pub mod table;

pub use self::config::execute_config;
pub use self::run::execute_run;
pub use self::table::execute_table;

use crate::config::Config;
use crate::error::Result;
use actes_store::SqliteStore;
use std::fs;

/// Open the configured SQLite store, creating its directory if needed.
pub(crate) fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(SqliteStore::new(path)?)
}
