//! Table command implementation.

use super::open_store;
use crate::cli::{TableAction, TableArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::fs;
use tracing::info;

/// Execute the table command.
pub fn execute_table(args: TableArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;

    match args.action {
        TableAction::Import { table, file } => {
            let contents = fs::read_to_string(&file)?;
            let imported = store.import_json(&table, &contents)?;
            info!(table = %table, rows = imported, file = %file.display(), "table imported");
            eprintln!(
                "{}",
                formatter.success(&format!("Imported {} row(s) into '{}'", imported, table))
            );
        }
        TableAction::Show { table } => {
            let rows = store.rows(&table)?;
            println!("{}", formatter.format_rows(&rows)?);
        }
    }

    Ok(())
}
