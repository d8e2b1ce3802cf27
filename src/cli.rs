//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::domain::OrderStatus;
use clap::Parser;
use std::path::PathBuf;

/// Environment variable read as the export URL when neither `--input` nor
/// `--url` is given.
pub const URL_ENV_VAR: &str = "SALES_EXPORT_URL";

/// Sales Aggregator - declarative sales analytics over order exports
///
/// Reads JSON order exports from a directory, a file or a URL, removes
/// re-exported duplicates and reports order counts, gross revenue and
/// products sold.
///
/// Examples:
///   sales-aggregator --input ./exports
///   sales-aggregator --input ./exports --format json --output q1.json
///   sales-aggregator --url https://shop.example.com/exports/orders.json
///   sales-aggregator --input ./exports --status shipped --top 5
///   sales-aggregator --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Order export file or directory to analyze
    #[arg(
        short,
        long,
        value_name = "PATH",
        conflicts_with = "url"
    )]
    pub input: Option<PathBuf>,

    /// HTTP(S) URL of an order export
    ///
    /// Falls back to SALES_EXPORT_URL when neither --input nor --url is given
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Output file path for the report
    ///
    /// Defaults to the config value, or sales_report.md
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .salesagg.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of files loaded concurrently
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Maximum number of files to load
    #[arg(long, value_name = "COUNT")]
    pub max_files: Option<usize>,

    /// Request timeout in seconds for --url
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// File extensions to include (comma-separated)
    ///
    /// Example: --extensions json,export
    #[arg(long, value_name = "EXTS", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Directory or file names to skip (comma-separated)
    ///
    /// Example: --exclude "archive,tmp"
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Also print the number of distinct orders with this status
    ///
    /// Values: new, paid, shipped, received
    #[arg(long, value_name = "STATUS")]
    pub status: Option<OrderStatus>,

    /// Rows in the top products table
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Exit with code 2 when any input failed to load
    #[arg(long)]
    pub fail_on_invalid: bool,

    /// Dry run: list the files that would be loaded and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .salesagg.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse().with_env_url(std::env::var(URL_ENV_VAR).ok())
    }

    /// Uses `env_url` as the export URL when no input was given at all.
    pub fn with_env_url(mut self, env_url: Option<String>) -> Self {
        if self.input.is_none() && self.url.is_none() {
            self.url = env_url.filter(|url| !url.trim().is_empty());
        }
        self
    }

    /// Human-readable name of the input source.
    pub fn source_label(&self) -> String {
        match (&self.url, &self.input) {
            (Some(url), _) => url.clone(),
            (None, Some(input)) => input.display().to_string(),
            (None, None) => String::new(),
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.input.is_none() && self.url.is_none() {
            return Err(format!("Either --input or --url (or {URL_ENV_VAR}) is required"));
        }

        if let Some(ref url) = self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("URL must start with 'http://' or 'https://'".to_string());
            }
            if self.dry_run {
                return Err("--dry-run needs --input".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input does not exist: {}", input.display()));
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.max_files == Some(0) {
            return Err("Max files must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// Returns the log level; `--quiet` wins over a configured `verbose`.
    pub fn log_level(&self, verbose_by_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_by_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
