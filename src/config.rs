//! Configuration for an ingestion run.
//!
//! [`IngestConfig`] is a plain serde-friendly struct with builder methods, so
//! hosts can load it from their own settings files or construct it in code.
//!
//! # Example
//!
//! ```rust
//! use inboxpack::config::IngestConfig;
//!
//! let config = IngestConfig::new()
//!     .with_retention_cap(500)
//!     .with_owner_name("Jordan Example");
//!
//! assert_eq!(config.retention_cap, 500);
//! ```

use serde::{Deserialize, Serialize};

/// Default number of most recent messages kept per conversation.
pub const DEFAULT_RETENTION_CAP: usize = 1000;

/// Default path segment under which conversation folders live.
pub const DEFAULT_CONVERSATIONS_ROOT: &str = "inbox";

/// Default upper bound for a single decompressed entry (256 MiB).
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

/// Settings for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Path segment that contains one sub-folder per conversation (default: `inbox`)
    pub conversations_root: String,

    /// Most recent messages kept per conversation (default: 1000)
    pub retention_cap: usize,

    /// Repair Meta's Latin-1 mojibake in names and message text (default: true)
    pub fix_encoding: bool,

    /// Maximum decompressed size of a single entry in bytes (default: 256 MiB)
    pub max_entry_size: u64,

    /// Archive owner's display name, when the host already knows it.
    ///
    /// When unset the owner is inferred from the first valid conversation.
    pub owner_name: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            conversations_root: DEFAULT_CONVERSATIONS_ROOT.to_string(),
            retention_cap: DEFAULT_RETENTION_CAP,
            fix_encoding: true,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            owner_name: None,
        }
    }
}

impl IngestConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the conversations root segment.
    #[must_use]
    pub fn with_conversations_root(mut self, root: impl Into<String>) -> Self {
        self.conversations_root = root.into();
        self
    }

    /// Sets the per-conversation retention cap.
    #[must_use]
    pub fn with_retention_cap(mut self, cap: usize) -> Self {
        self.retention_cap = cap;
        self
    }

    /// Enables or disables the encoding fix.
    #[must_use]
    pub fn with_fix_encoding(mut self, fix: bool) -> Self {
        self.fix_encoding = fix;
        self
    }

    /// Sets the maximum entry size.
    #[must_use]
    pub fn with_max_entry_size(mut self, size: u64) -> Self {
        self.max_entry_size = size;
        self
    }

    /// Sets the archive owner's name.
    #[must_use]
    pub fn with_owner_name(mut self, name: impl Into<String>) -> Self {
        self.owner_name = Some(name.into());
        self
    }
}
