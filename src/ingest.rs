//! Ingestion entry point.
//!
//! [`Ingestor`] routes an [`IngestInput`] to the right entry source, runs the
//! aggregation pass and wraps the summaries in an [`IngestionResult`].
//!
//! # Example
//!
//! ```rust,no_run
//! use inboxpack::config::IngestConfig;
//! use inboxpack::ingest::{IngestInput, Ingestor};
//! use inboxpack::progress::stderr_progress;
//!
//! # async fn example() -> inboxpack::Result<()> {
//! let input = IngestInput::from_path("instagram-export.zip").await?;
//! let result = Ingestor::new(IngestConfig::default())
//!     .with_progress(stderr_progress())
//!     .ingest(input)
//!     .await?;
//!
//! for conversation in &result.conversations {
//!     println!("{}: {} messages", conversation.correspondent_name, conversation.total_message_count);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::aggregate::{AggregationReport, FileFailure, SkippedFolder, aggregate, aggregate_single_page};
use crate::archive::{DirectoryArchive, EntrySource, ZipArchiveReader, build_synthetic_archive};
use crate::classify::page_of;
use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::models::IngestionResult;
use crate::progress::{Phase, ProgressCallback, no_progress, report};

/// Folder key used for conversations uploaded as bare JSON files.
pub const LOOSE_FOLDER_KEY: &str = "direct_upload";

/// A JSON page supplied without its archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseFile {
    /// Original file name, used to order pages.
    pub name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl LooseFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// What to ingest.
#[derive(Debug, Clone)]
pub enum IngestInput {
    /// A whole export `.zip`, in memory.
    Archive(Vec<u8>),
    /// A whole export `.zip` on disk, read one entry at a time.
    ArchiveFile(PathBuf),
    /// One or more `message_<N>.json` pages of a single conversation.
    LooseFiles(Vec<LooseFile>),
    /// An export that was already extracted to disk.
    Directory(PathBuf),
}

impl IngestInput {
    /// Picks an input kind from what is found at `path`.
    ///
    /// Directories and `.zip` files are read in place; `.json` files become a
    /// single loose page.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.is_dir() {
            return Ok(Self::Directory(path.to_path_buf()));
        }

        match extension_of(path).as_deref() {
            Some("zip") => Ok(Self::ArchiveFile(path.to_path_buf())),
            Some("json") => Ok(Self::LooseFiles(vec![read_loose(path).await?])),
            _ => Err(IngestError::unsupported(format!(
                "expected a directory, .zip or .json file: {}",
                path.display()
            ))),
        }
    }

    /// Like [`from_path`](Self::from_path), but several paths must all be
    /// `.json` pages of the same conversation.
    pub async fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        match paths {
            [] => Err(IngestError::unsupported("no input files provided")),
            [single] => Self::from_path(single).await,
            many => {
                let mut files = Vec::with_capacity(many.len());
                for path in many {
                    let path = path.as_ref();
                    if extension_of(path).as_deref() != Some("json") {
                        return Err(IngestError::unsupported(format!(
                            "multiple inputs must all be .json pages: {}",
                            path.display()
                        )));
                    }
                    files.push(read_loose(path).await?);
                }
                Ok(Self::LooseFiles(files))
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Archive(_) => "archive",
            Self::ArchiveFile(_) => "archive_file",
            Self::LooseFiles(_) => "loose_files",
            Self::Directory(_) => "directory",
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

async fn read_loose(path: &Path) -> Result<LooseFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(LooseFile::new(name, tokio::fs::read(path).await?))
}

/// A finished run together with what was dropped along the way.
#[derive(Debug)]
pub struct IngestOutcome {
    /// The result handed to the host.
    pub result: IngestionResult,
    /// Folders that produced no conversation.
    pub skipped: Vec<SkippedFolder>,
    /// Message files whose content was dropped.
    pub file_failures: Vec<FileFailure>,
}

/// Runs ingestion with a fixed configuration and progress sink.
#[derive(Clone)]
pub struct Ingestor {
    config: IngestConfig,
    progress: ProgressCallback,
}

impl Ingestor {
    /// Creates an ingestor that reports no progress.
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            progress: no_progress(),
        }
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Ingests one input.
    ///
    /// # Errors
    ///
    /// Fails only for problems that affect the whole run: an unreadable
    /// archive or directory, or an input with nothing to read. An input with
    /// no usable conversation is an empty result, not an error.
    pub async fn ingest(&self, input: IngestInput) -> Result<IngestionResult> {
        Ok(self.ingest_detailed(input).await?.result)
    }

    /// Ingests one input and keeps the per-folder and per-file diagnostics.
    pub async fn ingest_detailed(&self, input: IngestInput) -> Result<IngestOutcome> {
        let session_token = Uuid::new_v4().to_string();
        tracing::info!(session = %session_token, input = input.kind(), "Starting ingestion");
        (self.progress)(report(Phase::Loading, 0, 1));

        let aggregation = match input {
            IngestInput::Archive(bytes) => {
                let reader = ZipArchiveReader::open(bytes)?
                    .with_max_entry_size(self.config.max_entry_size);
                self.aggregate_source(&reader).await
            }
            IngestInput::ArchiveFile(path) => {
                let reader = ZipArchiveReader::open_path(path)
                    .await?
                    .with_max_entry_size(self.config.max_entry_size);
                self.aggregate_source(&reader).await
            }
            IngestInput::Directory(path) => {
                let reader = DirectoryArchive::open(path)
                    .await?
                    .with_max_entry_size(self.config.max_entry_size);
                self.aggregate_source(&reader).await
            }
            IngestInput::LooseFiles(files) => self.aggregate_loose(files).await?,
        };

        (self.progress)(report(Phase::Finalizing, 0, 1));
        let outcome = self.finish(aggregation, session_token);
        (self.progress)(report(Phase::Done, 1, 1));

        tracing::info!(
            session = %outcome.result.session_token,
            conversations = outcome.result.conversations.len(),
            skipped = outcome.skipped.len(),
            failed_files = outcome.file_failures.len(),
            "Ingestion finished"
        );
        Ok(outcome)
    }

    async fn aggregate_source(&self, source: &dyn EntrySource) -> AggregationReport {
        (self.progress)(report(Phase::Loading, 1, 1));
        aggregate(source, &self.config, &self.progress).await
    }

    async fn aggregate_loose(&self, mut files: Vec<LooseFile>) -> Result<AggregationReport> {
        match files.len() {
            0 => Err(IngestError::unsupported("no input files provided")),
            1 => {
                let file = files.remove(0);
                (self.progress)(report(Phase::Loading, 1, 1));
                (self.progress)(report(Phase::Processing, 0, 1));
                let aggregation = aggregate_single_page(&file.bytes, LOOSE_FOLDER_KEY, &self.config);
                (self.progress)(report(Phase::Processing, 1, 1));
                Ok(aggregation)
            }
            _ => {
                // Unnumbered pages go last; ties keep upload order.
                files.sort_by_key(|f| match page_of(&f.name) {
                    Some(page) => (false, page),
                    None => (true, 0),
                });
                let root = format!("messages/{}", self.config.conversations_root);
                let bytes = build_synthetic_archive(
                    &root,
                    LOOSE_FOLDER_KEY,
                    files.iter().map(|f| f.bytes.as_slice()),
                )
                .map_err(|e| IngestError::zip_format(e, None))?;

                let reader = ZipArchiveReader::open(bytes)?
                    .with_max_entry_size(self.config.max_entry_size);
                Ok(self.aggregate_source(&reader).await)
            }
        }
    }

    fn finish(&self, aggregation: AggregationReport, session_token: String) -> IngestOutcome {
        let owner_name = self
            .config
            .owner_name
            .clone()
            .or(aggregation.owner_name);

        IngestOutcome {
            result: IngestionResult {
                conversations: aggregation.summaries,
                owner_name,
                session_token,
            },
            skipped: aggregation.skipped,
            file_failures: aggregation.file_failures,
        }
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Ingests `input` with the default configuration and no progress.
pub async fn ingest(input: IngestInput) -> Result<IngestionResult> {
    Ingestor::default().ingest(input).await
}
