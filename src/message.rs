//! Typed message model.
//!
//! Export documents are loosely structured: fields come and go between export
//! versions and most of them are irrelevant here. [`Message`] keeps only the
//! structural subset a downstream analysis needs, and the parser in
//! [`crate::parsing`] fills it from a generic JSON document, ignoring anything
//! it does not recognize.
//!
//! # Example
//!
//! ```
//! use inboxpack::message::{Attachment, Message};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
//! let msg = Message::new("Alice")
//!     .with_content("look at this")
//!     .with_timestamp(ts)
//!     .with_attachment(Attachment::Photo);
//!
//! assert_eq!(msg.content(), Some("look at this"));
//! assert!(msg.has_attachments());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A non-text part of a message.
///
/// Only the kind is kept; media URIs point into the archive and are not
/// carried forward. Shared links keep their target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Attachment {
    /// A `photos` entry
    Photo,
    /// A `videos` entry
    Video,
    /// An `audio_files` entry
    Audio,
    /// A `gifs` entry
    Gif,
    /// A `sticker`
    Sticker,
    /// A `files` entry
    File,
    /// A `share` block (post, reel, story or external link)
    Share {
        /// Shared URL, when the export includes one
        #[serde(skip_serializing_if = "Option::is_none", default)]
        link: Option<String>,
    },
}

/// One message from a conversation page.
///
/// | Field | Source field | Notes |
/// |-------|--------------|-------|
/// | `sender` | `sender_name` | empty when absent |
/// | `content` | `content` | `None` for media-only messages |
/// | `timestamp` | `timestamp_ms` | milliseconds since the Unix epoch |
/// | `attachments` | `photos`, `videos`, `audio_files`, `gifs`, `sticker`, `files`, `share` | one marker per item |
/// | `reactions` | `reactions` | count only |
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the author.
    pub sender: String,

    /// Text content, if the message has any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,

    /// When the message was sent.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Attachment markers, in source field order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachments: Vec<Attachment>,

    /// Number of reactions on the message.
    #[serde(skip_serializing_if = "is_zero", default)]
    pub reactions: usize,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Message {
    /// Creates a message with only a sender.
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            ..Self::default()
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Sets the text content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Appends an attachment marker.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Sets the reaction count.
    #[must_use]
    pub fn with_reactions(mut self, reactions: usize) -> Self {
        self.reactions = reactions;
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the text content, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the timestamp, if available.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Returns `true` if the message carries any attachment marker.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Returns the shared link, if the message is a share.
    pub fn shared_link(&self) -> Option<&str> {
        self.attachments.iter().find_map(|a| match a {
            Attachment::Share { link } => link.as_deref(),
            _ => None,
        })
    }
}
