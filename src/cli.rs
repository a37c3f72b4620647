//! Command-line interface definition using clap.
//!
//! [`Args`] maps straight onto an [`IngestConfig`] via
//! [`Args::to_config`], so the binary stays a thin wrapper over the library.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CONVERSATIONS_ROOT, DEFAULT_RETENTION_CAP, IngestConfig};

/// Default output file stem; the extension follows the chosen format.
pub const DEFAULT_OUTPUT_STEM: &str = "conversations";

/// Rebuild one-to-one conversations from an Instagram data export.
#[derive(Parser, Debug, Clone)]
#[command(name = "inboxpack")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    inboxpack instagram-export.zip
    inboxpack ./extracted-export -f csv -o overview.csv
    inboxpack message_1.json message_2.json --owner \"Jordan\"
    inboxpack export.zip --cap 200 -f jsonl")]
pub struct Args {
    /// Export `.zip`, extracted export directory, or one or more `message_<N>.json` pages
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Path to output file [default: conversations.<format extension>]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Archive owner's display name, instead of inferring it
    #[arg(long, value_name = "NAME")]
    pub owner: Option<String>,

    /// Most recent messages kept per conversation
    #[arg(long, value_name = "N", default_value_t = DEFAULT_RETENTION_CAP)]
    pub cap: usize,

    /// Keep names and text exactly as exported (skip mojibake repair)
    #[arg(long)]
    pub no_fix_encoding: bool,

    /// Path segment holding one folder per conversation
    #[arg(long, value_name = "SEGMENT", default_value = DEFAULT_CONVERSATIONS_ROOT)]
    pub root: String,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the run configuration from the parsed flags.
    pub fn to_config(&self) -> IngestConfig {
        let mut config = IngestConfig::new()
            .with_conversations_root(self.root.clone())
            .with_retention_cap(self.cap)
            .with_fix_encoding(!self.no_fix_encoding);
        if let Some(owner) = &self.owner {
            config = config.with_owner_name(owner.clone());
        }
        config
    }

    /// Output path, defaulting to `conversations.<ext>` for the chosen format.
    pub fn output_path(&self) -> String {
        self.output.clone().unwrap_or_else(|| {
            let format: crate::format::OutputFormat = self.format.into();
            format!("{DEFAULT_OUTPUT_STEM}.{}", format.extension())
        })
    }

    /// Log filter directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "inboxpack=error",
            (false, 0) => "inboxpack=info",
            (false, 1) => "inboxpack=debug",
            (false, _) => "inboxpack=trace",
        }
    }
}

/// Output format options.
///
/// ```rust
/// use inboxpack::cli::OutputFormat;
///
/// assert_eq!(OutputFormat::Csv.to_string(), "CSV");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full result as one JSON document
    #[default]
    Json,

    /// One conversation per line
    #[value(alias = "ndjson")]
    Jsonl,

    /// Overview table, one row per conversation
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&crate::format::OutputFormat::from(*self), f)
    }
}

impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Jsonl => Self::Jsonl,
            OutputFormat::Csv => Self::Csv,
        }
    }
}
