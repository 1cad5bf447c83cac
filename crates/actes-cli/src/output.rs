//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use actes_domain::{OutputRecord, Row, OUTPUT_COLUMNS};
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Serializable view of an output record, fields in export column order.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    name: &'a str,
    date_of_death: Option<&'a str>,
    declarant_name: Option<&'a str>,
    city: Option<&'a str>,
    street: Option<&'a str>,
    phone: Option<&'a str>,
    email: Option<&'a str>,
    status: &'static str,
    image: &'a str,
}

impl<'a> From<&'a OutputRecord> for RecordView<'a> {
    fn from(record: &'a OutputRecord) -> Self {
        Self {
            name: &record.full_name,
            date_of_death: record.date_of_death.as_deref(),
            declarant_name: record.declarant_name.as_deref(),
            city: record.city.as_deref(),
            street: record.street.as_deref(),
            phone: record.phone.as_deref(),
            email: record.email.as_deref(),
            status: record.status.as_str(),
            image: &record.image_reference,
        }
    }
}

/// Records as a pretty-printed JSON array.
pub fn records_json(records: &[OutputRecord]) -> Result<String> {
    let views: Vec<RecordView<'_>> = records.iter().map(RecordView::from).collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format output records.
    pub fn format_records(&self, records: &[OutputRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => records_json(records),
            OutputFormat::Table => Ok(self.format_records_table(records)),
        }
    }

    fn format_records_table(&self, records: &[OutputRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No records.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(OUTPUT_COLUMNS);
        for record in records {
            builder.push_record(record.cells());
        }
        self.render(builder)
    }

    /// Format store rows; columns are the union of row columns in first-seen order.
    pub fn format_rows(&self, rows: &[Row]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let objects: Vec<serde_json::Map<String, serde_json::Value>> = rows
                    .iter()
                    .map(|row| {
                        row.cells()
                            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
                            .collect()
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&objects)?)
            }
            OutputFormat::Table => Ok(self.format_rows_table(rows)),
        }
    }

    fn format_rows_table(&self, rows: &[Row]) -> String {
        if rows.is_empty() {
            return self.colorize("No rows found.", "yellow");
        }

        let mut columns: Vec<&str> = Vec::new();
        for (column, _) in rows.iter().flat_map(|row| row.cells()) {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                columns.push(column);
            }
        }

        let mut builder = Builder::default();
        builder.push_record(columns.iter().copied());
        for row in rows {
            builder.push_record(columns.iter().map(|c| row.get(c).unwrap_or_default()));
        }
        self.render(builder)
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
