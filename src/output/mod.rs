//! Writers for ingestion results.
//!
//! - [`write_json`] / [`to_json`] - the whole [`IngestionResult`](crate::models::IngestionResult),
//!   pretty-printed - requires `json-output` feature
//! - [`write_jsonl`] / [`to_jsonl`] - one conversation per line - requires `json-output` feature
//! - [`write_csv`] / [`to_csv`] - semicolon-delimited overview table, one row
//!   per conversation - requires `csv-output` feature
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # async fn example() -> inboxpack::Result<()> {
//! use inboxpack::ingest::{IngestInput, ingest};
//! use inboxpack::output::{to_csv, write_json};
//!
//! let result = ingest(IngestInput::from_path("export.zip").await?).await?;
//!
//! write_json(&result, "conversations.json")?;
//! println!("{}", to_csv(&result)?);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{to_jsonl, write_jsonl};
