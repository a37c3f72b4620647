//! Result types handed to the host after a run.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Participant names from a folder's first page, in file order.
///
/// By export convention index 0 is the archive owner and index 1 is the
/// correspondent. The order is taken as-is and never checked against a known
/// owner name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantIdentity {
    names: Vec<String>,
}

impl ParticipantIdentity {
    /// Wraps an ordered participant list.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Returns `true` for a one-to-one conversation.
    pub fn is_valid(&self) -> bool {
        self.names.len() == 2
    }

    /// The archive owner (index 0), for a valid identity.
    pub fn owner(&self) -> Option<&str> {
        self.is_valid().then(|| self.names[0].as_str())
    }

    /// The other person (index 1), for a valid identity.
    pub fn correspondent(&self) -> Option<&str> {
        self.is_valid().then(|| self.names[1].as_str())
    }

    /// All names in file order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// One reconstructed one-to-one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Dense sequential id, in folder discovery order.
    pub id: usize,
    /// Display name of the other participant.
    pub correspondent_name: String,
    /// Folder key the conversation was read from.
    pub source_folder_key: String,
    /// Number of message files in the folder.
    pub file_count: usize,
    /// Messages read across all readable files, before the retention cap.
    pub total_message_count: usize,
    /// The last `retention_cap` messages in file traversal order.
    pub messages: Vec<Message>,
    /// Set by the downstream analysis service.
    #[serde(default)]
    pub analyzed: bool,
}

/// Final output of an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    /// Summaries in folder discovery order.
    pub conversations: Vec<ConversationSummary>,
    /// Best guess of the archive owner's name.
    pub owner_name: Option<String>,
    /// Opaque identifier for this run.
    pub session_token: String,
}

impl IngestionResult {
    /// Returns `true` if no conversation was reconstructed.
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Total messages across all conversations, before capping.
    pub fn total_messages(&self) -> usize {
        self.conversations
            .iter()
            .map(|c| c.total_message_count)
            .sum()
    }
}
