//! CSV output writer.

use std::fs::File;
use std::io::Write;

use crate::error::{IngestError, Result};
use crate::models::{ConversationSummary, IngestionResult};

const HEADER: [&str; 7] = ["ID", "Correspondent", "Folder", "Files", "Total", "Kept", "LastMessage"];

/// Writes one row per conversation, semicolon-delimited.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `ID`, `Correspondent`, `Folder`, `Files`, `Total`, `Kept`,
///   `LastMessage` (timestamp of the last kept message, if any)
/// - Encoding: UTF-8
pub fn write_csv(result: &IngestionResult, output_path: &str) -> Result<()> {
    write_rows(result, File::create(output_path)?)
}

/// Same table as [`write_csv`], returned as a string.
pub fn to_csv(result: &IngestionResult) -> Result<String> {
    let mut buffer = Vec::new();
    write_rows(result, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| IngestError::Io(std::io::Error::other(e)))
}

fn write_rows<W: Write>(result: &IngestionResult, sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(sink);

    writer.write_record(HEADER)?;
    for conversation in &result.conversations {
        writer.write_record(build_record(conversation))?;
    }

    writer.flush()?;
    Ok(())
}

fn build_record(conversation: &ConversationSummary) -> Vec<String> {
    let last_message = conversation
        .messages
        .iter()
        .rev()
        .find_map(|m| m.timestamp())
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();

    vec![
        conversation.id.to_string(),
        conversation.correspondent_name.clone(),
        conversation.source_folder_key.clone(),
        conversation.file_count.to_string(),
        conversation.total_message_count.to_string(),
        conversation.messages.len().to_string(),
        last_message,
    ]
}
