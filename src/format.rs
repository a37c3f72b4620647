//! Output format selection.
//!
//! [`OutputFormat`] is independent of the CLI so hosts can pick a writer
//! without pulling in clap.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn example() -> inboxpack::Result<()> {
//! use inboxpack::format::{OutputFormat, to_format_string};
//! use inboxpack::models::IngestionResult;
//!
//! let result = IngestionResult {
//!     conversations: Vec::new(),
//!     owner_name: None,
//!     session_token: "session".into(),
//! };
//!
//! let format = OutputFormat::from_path("conversations.jsonl")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! let _csv = to_format_string(&result, OutputFormat::Csv)?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::models::IngestionResult;

/// How an [`IngestionResult`] is written out.
///
/// - [`Json`](OutputFormat::Json) - the full result, as handed to a host
/// - [`Jsonl`](OutputFormat::Jsonl) - one conversation per line
/// - [`Csv`](OutputFormat::Csv) - an overview table without message bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Pretty-printed JSON document (default)
    #[default]
    Json,

    /// JSON Lines, also known as NDJSON
    Jsonl,

    /// Semicolon-delimited summary table
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    ///
    /// ```rust
    /// use inboxpack::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Jsonl.extension(), "jsonl");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson", "csv"]
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Jsonl => "application/x-ndjson",
            OutputFormat::Csv => "text/csv",
        }
    }

    /// Detects format from a file path based on extension.
    pub fn from_path(path: &str) -> Result<Self, IngestError> {
        let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();
        ext.parse().map_err(|_| {
            IngestError::unsupported(format!(
                "unknown output extension '.{ext}', expected one of: json, jsonl, csv"
            ))
        })
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

fn feature_missing(format: OutputFormat) -> IngestError {
    let feature = match format {
        OutputFormat::Csv => "csv-output",
        OutputFormat::Json | OutputFormat::Jsonl => "json-output",
    };
    IngestError::unsupported(format!(
        "output format {format} requires the '{feature}' feature"
    ))
}

/// Writes the result to `path` in the given format.
///
/// # Errors
///
/// Returns an error if the format's feature is disabled or the file cannot
/// be written.
#[allow(unused_variables)]
pub fn write_to_format(
    result: &IngestionResult,
    path: &str,
    format: OutputFormat,
) -> Result<(), IngestError> {
    match format {
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::output::write_json(result, path),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::output::write_jsonl(result, path),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::output::write_csv(result, path),
        #[allow(unreachable_patterns)]
        _ => Err(feature_missing(format)),
    }
}

/// Renders the result as a string in the given format.
#[allow(unused_variables)]
pub fn to_format_string(
    result: &IngestionResult,
    format: OutputFormat,
) -> Result<String, IngestError> {
    match format {
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::output::to_json(result),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::output::to_jsonl(result),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::output::to_csv(result),
        #[allow(unreachable_patterns)]
        _ => Err(feature_missing(format)),
    }
}
