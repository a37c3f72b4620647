//! # inboxpack
//!
//! Rebuilds one-to-one conversations from an Instagram "Download your
//! information" export.
//!
//! ## Overview
//!
//! An export keeps every conversation in its own folder:
//!
//! ```text
//! messages/inbox/<folder_key>/message_1.json
//! messages/inbox/<folder_key>/message_2.json
//! messages/inbox/<folder_key>/photos/...
//! ```
//!
//! The first page names the two participants; every page carries a slice of
//! the message history. inboxpack walks the export once, keeps only the
//! conversations with exactly two participants, and returns one
//! [`ConversationSummary`](models::ConversationSummary) per conversation
//! holding its most recent messages.
//!
//! Broken pieces of an export never fail the run. A page that cannot be read
//! loses only its own messages, and a folder without a usable first page is
//! skipped. The only fatal errors are an unreadable archive and an input with
//! nothing in it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inboxpack::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let input = IngestInput::from_path("instagram-export.zip").await?;
//! let result = Ingestor::new(IngestConfig::default())
//!     .with_progress(stderr_progress())
//!     .ingest(input)
//!     .await?;
//!
//! println!("owner: {:?}", result.owner_name);
//! for conversation in &result.conversations {
//!     println!(
//!         "#{} {} ({} messages)",
//!         conversation.id, conversation.correspondent_name, conversation.total_message_count
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`archive`] - [`EntrySource`](archive::EntrySource) over a zip or an extracted directory
//! - [`classify`] - which entry paths are conversation pages
//! - [`parsing`] - page documents to [`Message`]s and participant lists
//! - [`aggregate`] - per-folder aggregation with failure isolation
//! - [`progress`] - phase-banded progress events
//! - [`ingest`] - input routing and the [`Ingestor`](ingest::Ingestor) entry point
//! - [`config`] - [`IngestConfig`](config::IngestConfig)
//! - [`models`] - result types handed to the host
//! - [`output`] / [`format`] - JSON, JSONL and CSV writers
//! - [`error`] - [`IngestError`] and the per-unit error kinds

pub mod aggregate;
pub mod archive;
pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod message;
pub mod models;
pub mod output;
pub mod parsing;
pub mod progress;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use inboxpack::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Message;
    pub use crate::error::{IngestError, Result};

    pub use crate::config::IngestConfig;
    pub use crate::ingest::{IngestInput, IngestOutcome, Ingestor, LooseFile, ingest};
    pub use crate::models::{ConversationSummary, IngestionResult};
    pub use crate::progress::{
        Phase, ProgressCallback, ProgressEvent, no_progress, stderr_progress, tracing_progress,
    };

    pub use crate::format::{OutputFormat, to_format_string, write_to_format};
}
