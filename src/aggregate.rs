//! Conversation aggregation.
//!
//! Turns the entry listing of an [`EntrySource`] into one
//! [`ConversationSummary`] per one-to-one conversation folder.
//!
//! Failures are contained at the smallest unit that can absorb them:
//!
//! - a member file that cannot be read or parsed loses only its own
//!   messages ([`FileFailure`]);
//! - a folder without a usable first page is skipped ([`SkippedFolder`]).
//!
//! Neither stops the run. Every outcome is kept in an [`AggregationReport`]
//! so callers (and tests) can see exactly what was dropped and why.

use std::collections::{HashMap, VecDeque};

use crate::archive::EntrySource;
use crate::classify::classify;
use crate::config::IngestConfig;
use crate::error::{FileError, IdentityError};
use crate::message::Message;
use crate::models::{ConversationSummary, ParticipantIdentity};
use crate::parsing::{MessagePage, parse_page};
use crate::progress::{ProgressCallback, ProgressState};

/// Message files of one conversation, grouped by folder key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationFolder {
    /// Folder key shared by every member.
    pub key: String,
    /// Member file paths in discovery order.
    pub members: Vec<String>,
    /// Path of the `message_1.json` member, if present.
    pub canonical: Option<String>,
}

/// Groups message files by folder key.
///
/// Folders are returned in the order their first member was seen, and each
/// folder keeps its members in listing order. Paths outside the conversation
/// namespace are ignored.
pub fn group_folders<'a>(
    paths: impl IntoIterator<Item = &'a str>,
    root: &str,
) -> Vec<ConversationFolder> {
    let mut folders: Vec<ConversationFolder> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for path in paths {
        let Some(class) = classify(path, root) else {
            continue;
        };
        let is_canonical = class.is_canonical();
        let slot = *index.entry(class.folder_key).or_insert_with_key(|key| {
            folders.push(ConversationFolder {
                key: key.clone(),
                members: Vec::new(),
                canonical: None,
            });
            folders.len() - 1
        });

        let folder = &mut folders[slot];
        folder.members.push(path.to_string());
        if is_canonical && folder.canonical.is_none() {
            folder.canonical = Some(path.to_string());
        }
    }

    folders
}

/// Keeps the most recent `cap` messages of a stream while counting all of them.
///
/// "Most recent" means last in traversal order; no timestamp sorting is done.
#[derive(Debug, Clone)]
pub struct MessageWindow {
    cap: usize,
    total: usize,
    kept: VecDeque<Message>,
}

impl MessageWindow {
    /// Creates an empty window.
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            total: 0,
            kept: VecDeque::with_capacity(cap.min(1024)),
        }
    }

    /// Appends one message, evicting the oldest kept one when full.
    pub fn push(&mut self, message: Message) {
        self.total += 1;
        if self.cap == 0 {
            return;
        }
        if self.kept.len() == self.cap {
            self.kept.pop_front();
        }
        self.kept.push_back(message);
    }

    /// Number of messages pushed so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of messages currently kept.
    pub fn len(&self) -> usize {
        self.kept.len()
    }

    /// Returns `true` if nothing is kept.
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }

    /// Consumes the window, returning kept messages in traversal order.
    pub fn into_messages(self) -> Vec<Message> {
        self.kept.into()
    }
}

impl Extend<Message> for MessageWindow {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        for message in iter {
            self.push(message);
        }
    }
}

/// A folder that produced no summary.
#[derive(Debug)]
pub struct SkippedFolder {
    /// Folder key
    pub folder_key: String,
    /// Why the folder was skipped
    pub reason: IdentityError,
}

/// A member file whose messages were dropped.
#[derive(Debug)]
pub struct FileFailure {
    /// Folder the file belongs to
    pub folder_key: String,
    /// Entry path
    pub path: String,
    /// What went wrong
    pub error: FileError,
}

/// Result of processing a single folder.
#[derive(Debug)]
pub enum FolderOutcome {
    /// The folder produced a summary.
    Built(ConversationSummary),
    /// The folder was skipped.
    Skipped(SkippedFolder),
}

/// Everything an aggregation pass produced.
#[derive(Debug, Default)]
pub struct AggregationReport {
    /// Summaries in folder discovery order, with dense ids.
    pub summaries: Vec<ConversationSummary>,
    /// Folders that produced nothing.
    pub skipped: Vec<SkippedFolder>,
    /// Member files that were dropped from otherwise valid folders.
    pub file_failures: Vec<FileFailure>,
    /// Owner name (participant 0) of the first summarized conversation.
    pub owner_name: Option<String>,
}

impl AggregationReport {
    /// Number of folders considered.
    pub fn folder_count(&self) -> usize {
        self.summaries.len() + self.skipped.len()
    }

    /// Drops the diagnostics and keeps the summaries.
    pub fn into_summaries(self) -> Vec<ConversationSummary> {
        self.summaries
    }

    fn record(&mut self, outcome: FolderOutcome, identity: Option<ParticipantIdentity>) {
        match outcome {
            FolderOutcome::Built(summary) => {
                if self.owner_name.is_none() {
                    self.owner_name = identity
                        .as_ref()
                        .and_then(|i| i.owner())
                        .map(str::to_string);
                }
                self.summaries.push(summary);
            }
            FolderOutcome::Skipped(skipped) => self.skipped.push(skipped),
        }
    }
}

/// Reads every conversation folder of `source`, strictly one after another.
///
/// Emits one processing event before the first folder and one after each
/// folder. Never fails: problems are recorded in the report.
pub async fn aggregate(
    source: &dyn EntrySource,
    config: &IngestConfig,
    progress: &ProgressCallback,
) -> AggregationReport {
    let folders = group_folders(
        source.entry_paths().iter().map(String::as_str),
        &config.conversations_root,
    );
    tracing::debug!(
        source = source.name(),
        folders = folders.len(),
        "Grouped conversation folders"
    );

    let mut report = AggregationReport::default();
    let mut state = ProgressState::new(folders.len());
    progress(state.event());

    for folder in &folders {
        let next_id = report.summaries.len();
        match process_folder(source, folder, config, &mut report.file_failures).await {
            Ok((identity, window)) => {
                let summary = build_summary(next_id, &identity, folder, window);
                tracing::debug!(
                    folder = %folder.key,
                    id = summary.id,
                    messages = summary.total_message_count,
                    "Built conversation summary"
                );
                report.record(FolderOutcome::Built(summary), Some(identity));
            }
            Err(reason) => {
                tracing::warn!(folder = %folder.key, %reason, "Skipping conversation folder");
                report.record(
                    FolderOutcome::Skipped(SkippedFolder {
                        folder_key: folder.key.clone(),
                        reason,
                    }),
                    None,
                );
            }
        }

        state = state.advance();
        progress(state.event());
        tokio::task::yield_now().await;
    }

    report
}

/// Builds a report for one standalone page, without any archive.
///
/// The page is both the identity source and the only member file.
pub fn aggregate_single_page(bytes: &[u8], folder_key: &str, config: &IngestConfig) -> AggregationReport {
    let folder = ConversationFolder {
        key: folder_key.to_string(),
        members: vec![folder_key.to_string()],
        canonical: Some(folder_key.to_string()),
    };

    let identified = parse_page(bytes, config.fix_encoding)
        .map_err(IdentityError::UnparsablePage)
        .and_then(|page| page.identity().map(|identity| (identity, page)));

    let mut report = AggregationReport::default();
    match identified {
        Ok((identity, page)) => {
            let mut window = MessageWindow::new(config.retention_cap);
            window.extend(page.messages);
            let summary = build_summary(0, &identity, &folder, window);
            report.record(FolderOutcome::Built(summary), Some(identity));
        }
        Err(reason) => {
            tracing::warn!(%reason, "Standalone page has no usable conversation");
            report.record(
                FolderOutcome::Skipped(SkippedFolder {
                    folder_key: folder.key,
                    reason,
                }),
                None,
            );
        }
    }
    report
}

async fn process_folder(
    source: &dyn EntrySource,
    folder: &ConversationFolder,
    config: &IngestConfig,
    failures: &mut Vec<FileFailure>,
) -> Result<(ParticipantIdentity, MessageWindow), IdentityError> {
    let canonical = folder
        .canonical
        .as_deref()
        .ok_or(IdentityError::MissingCanonicalPage)?;

    let bytes = source
        .entry(canonical)
        .load()
        .await
        .map_err(IdentityError::UnreadablePage)?;
    let first_page = parse_page(&bytes, config.fix_encoding).map_err(IdentityError::UnparsablePage)?;
    let identity = first_page.identity()?;

    let mut first_messages = Some(first_page.messages);
    let mut window = MessageWindow::new(config.retention_cap);

    for path in &folder.members {
        if path == canonical {
            if let Some(messages) = first_messages.take() {
                window.extend(messages);
                continue;
            }
        }

        match load_page(source, path, config.fix_encoding).await {
            Ok(page) => window.extend(page.messages),
            Err(error) => {
                tracing::warn!(folder = %folder.key, path = %path, %error, "Dropping unreadable message file");
                failures.push(FileFailure {
                    folder_key: folder.key.clone(),
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    Ok((identity, window))
}

async fn load_page(
    source: &dyn EntrySource,
    path: &str,
    fix_encoding: bool,
) -> Result<MessagePage, FileError> {
    let bytes = source.entry(path).load().await?;
    Ok(parse_page(&bytes, fix_encoding)?)
}

fn build_summary(
    id: usize,
    identity: &ParticipantIdentity,
    folder: &ConversationFolder,
    window: MessageWindow,
) -> ConversationSummary {
    ConversationSummary {
        id,
        correspondent_name: identity.correspondent().unwrap_or_default().to_string(),
        source_folder_key: folder.key.clone(),
        file_count: folder.members.len(),
        total_message_count: window.total(),
        messages: window.into_messages(),
        analyzed: false,
    }
}
