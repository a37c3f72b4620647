//! JSON output writer.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::Result;
use crate::models::IngestionResult;

/// Writes the result as one pretty-printed JSON document.
///
/// # Format
/// ```json
/// {
///   "conversations": [{"id": 0, "correspondentName": "Alice", ...}],
///   "ownerName": "Bob",
///   "sessionToken": "..."
/// }
/// ```
pub fn write_json(result: &IngestionResult, output_path: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.flush()?;
    Ok(())
}

/// Same document as [`write_json`], returned as a string.
pub fn to_json(result: &IngestionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
