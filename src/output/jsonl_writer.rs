//! JSON Lines (JSONL) output writer.
//!
//! One conversation per line, which suits pipelines that feed each
//! conversation to an analysis step on its own.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::Result;
use crate::models::IngestionResult;

/// Writes each conversation as one compact JSON object per line.
///
/// ```jsonl
/// {"id":0,"correspondentName":"Alice","sourceFolderKey":"alice_1",...}
/// {"id":1,"correspondentName":"Carol","sourceFolderKey":"carol_2",...}
/// ```
pub fn write_jsonl(result: &IngestionResult, output_path: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);

    for conversation in &result.conversations {
        serde_json::to_writer(&mut writer, conversation)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Same lines as [`write_jsonl`], returned as a string.
pub fn to_jsonl(result: &IngestionResult) -> Result<String> {
    let mut output = String::new();
    for conversation in &result.conversations {
        output.push_str(&serde_json::to_string(conversation)?);
        output.push('\n');
    }
    Ok(output)
}
