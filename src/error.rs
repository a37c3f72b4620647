//! Error types for inboxpack.
//!
//! Errors come in two scopes:
//!
//! - **Fatal** errors end the whole ingestion run and are returned to the
//!   caller as [`IngestError`]: an archive that cannot be opened
//!   ([`IngestError::Format`]) or an input shape that cannot be ingested
//!   ([`IngestError::UnsupportedInput`]).
//! - **Isolated** errors describe one archive entry ([`EntryReadError`]), one
//!   document ([`DocumentError`]) or one conversation folder
//!   ([`IdentityError`]). The aggregator records them in its report and keeps
//!   going; they never reach the caller as a failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for inboxpack operations.
///
/// # Example
///
/// ```rust
/// use inboxpack::error::Result;
/// use inboxpack::models::IngestionResult;
///
/// fn my_function() -> Result<Option<IngestionResult>> {
///     Ok(None)
/// }
/// ```
pub type Result<T> = std::result::Result<T, IngestError>;

/// The error type for a failed ingestion run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    /// The archive could not be opened at all.
    ///
    /// This happens when the blob is not a zip file, when its central
    /// directory is truncated, or when an export directory root cannot be
    /// walked.
    #[error("Unreadable archive{}: {source}", .path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    Format {
        /// The underlying container error
        #[source]
        source: FormatErrorKind,
        /// The archive location, if it came from disk
        path: Option<PathBuf>,
    },

    /// The input has a shape the ingestor does not accept.
    ///
    /// For example an empty file list, or a path that is neither a
    /// directory, a `.zip` archive nor a `.json` document.
    #[error("Unsupported input: {message}")]
    UnsupportedInput {
        /// Description of what was wrong with the input
        message: String,
    },

    /// An I/O error occurred outside of archive entry reads.
    ///
    /// Typically raised while loading the input file or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error while writing output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Kinds of container errors behind [`IngestError::Format`].
#[derive(Debug, Error)]
pub enum FormatErrorKind {
    /// Zip container error
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),
    /// Export directory traversal error
    #[error("{0}")]
    Directory(#[from] walkdir::Error),
}

/// A single archive entry could not be read.
///
/// Reading one entry never invalidates the rest of the archive.
#[derive(Debug, Error)]
pub enum EntryReadError {
    /// No entry with this path exists.
    #[error("entry '{path}' not found")]
    Missing {
        /// Entry path
        path: String,
    },

    /// The entry exists but its bytes could not be read.
    #[error("failed to read entry '{path}': {source}")]
    Io {
        /// Entry path
        path: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The entry's compressed stream is damaged.
    #[error("failed to decompress entry '{path}': {source}")]
    Decompress {
        /// Entry path
        path: String,
        /// The underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// The entry exceeds the configured size limit.
    #[error("entry '{path}' is too large: {size} bytes (maximum: {max_size} bytes)")]
    TooLarge {
        /// Entry path
        path: String,
        /// Declared uncompressed size
        size: u64,
        /// Configured maximum
        max_size: u64,
    },

    /// The background read task did not complete.
    #[error("read of entry '{path}' was interrupted: {source}")]
    Interrupted {
        /// Entry path
        path: String,
        /// The task failure
        #[source]
        source: tokio::task::JoinError,
    },
}

impl EntryReadError {
    /// Returns the path of the entry that failed.
    pub fn path(&self) -> &str {
        match self {
            EntryReadError::Missing { path }
            | EntryReadError::Io { path, .. }
            | EntryReadError::Decompress { path, .. }
            | EntryReadError::TooLarge { path, .. }
            | EntryReadError::Interrupted { path, .. } => path,
        }
    }
}

/// A message document could not be turned into a typed page.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The bytes are not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is valid but the top level is not an object.
    #[error("expected a JSON object at the top level")]
    NotAnObject,
}

/// A conversation folder has no usable participant identity.
///
/// The folder is skipped and produces no summary.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The folder has no `message_1.json` page.
    #[error("no first page (message_1.json) in folder")]
    MissingCanonicalPage,

    /// The first page could not be read from the archive.
    #[error("first page could not be read: {0}")]
    UnreadablePage(#[source] EntryReadError),

    /// The first page is not a valid message document.
    #[error("first page could not be parsed: {0}")]
    UnparsablePage(#[source] DocumentError),

    /// The participant list is not exactly two named people.
    #[error("expected 2 named participants, found {found}")]
    InvalidParticipants {
        /// Number of usable participants found
        found: usize,
    },
}

/// One member file of a folder failed and its messages were dropped.
#[derive(Debug, Error)]
pub enum FileError {
    /// Reading the entry failed
    #[error(transparent)]
    Read(#[from] EntryReadError),
    /// Parsing the document failed
    #[error(transparent)]
    Parse(#[from] DocumentError),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl IngestError {
    /// Creates a format error for a zip blob.
    pub fn zip_format(source: zip::result::ZipError, path: Option<PathBuf>) -> Self {
        IngestError::Format {
            source: FormatErrorKind::Zip(source),
            path,
        }
    }

    /// Creates a format error for an export directory.
    pub fn directory_format(source: walkdir::Error, path: PathBuf) -> Self {
        IngestError::Format {
            source: FormatErrorKind::Directory(source),
            path: Some(path),
        }
    }

    /// Creates an unsupported input error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        IngestError::UnsupportedInput {
            message: message.into(),
        }
    }

    /// Returns `true` if the archive itself could not be opened.
    pub fn is_format(&self) -> bool {
        matches!(self, IngestError::Format { .. })
    }

    /// Returns `true` if the input shape was rejected.
    pub fn is_unsupported_input(&self) -> bool {
        matches!(self, IngestError::UnsupportedInput { .. })
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, IngestError::Io(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
