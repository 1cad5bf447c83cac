//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Actes - extract death-certificate records and enrich them with declarant contacts.
#[derive(Debug, Parser)]
#[command(name = "actes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a directory of page images
    Run(RunArgs),

    /// Import or inspect store tables
    Table(TableArgs),

    /// Inspect the configuration
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Directory holding the rasterized page images
    pub images_dir: PathBuf,

    /// Batch name (defaults to the directory name)
    #[arg(short, long)]
    pub batch: Option<String>,

    /// Export file for the records (defaults to <exports>/<batch>.json)
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Process the batch even if its export file already exists
    #[arg(long)]
    pub force: bool,

    /// API key for the OpenAI-compatible provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Arguments for the table command.
#[derive(Debug, Parser)]
pub struct TableArgs {
    #[command(subcommand)]
    pub action: TableAction,
}

/// Table actions.
#[derive(Debug, Subcommand)]
pub enum TableAction {
    /// Append the objects of a JSON array file to a table
    Import {
        /// Table name (e.g. directory)
        table: String,
        /// JSON file containing an array of objects
        file: PathBuf,
    },

    /// Show the rows of a table
    Show {
        /// Table name
        table: String,
    },
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the configuration in effect
    Show,

    /// Print the configuration file path
    Path,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
