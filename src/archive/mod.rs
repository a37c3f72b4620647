//! Archive access.
//!
//! An [`EntrySource`] lists entry paths up front and reads entries one at a
//! time, on demand. Nothing is decompressed or loaded until
//! [`read_entry`](EntrySource::read_entry) is awaited for that path, so peak
//! memory is bounded by the largest entry rather than the whole export.
//!
//! Two sources are provided:
//!
//! - [`ZipArchiveReader`] - an export `.zip`, in memory or on disk
//! - [`DirectoryArchive`] - an export that has already been extracted to disk
//!
//! # Example
//!
//! ```rust,no_run
//! use inboxpack::archive::{EntrySource, ZipArchiveReader};
//!
//! # async fn example() -> inboxpack::Result<()> {
//! let reader = ZipArchiveReader::open_path("instagram-export.zip").await?;
//! let source: &dyn EntrySource = &reader;
//!
//! for entry in source.entries() {
//!     if entry.path().ends_with("message_1.json") {
//!         let _content = entry.load().await;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::EntryReadError;

mod directory;
mod zip_archive;

pub use directory::DirectoryArchive;
pub use zip_archive::{ZipArchiveReader, build_synthetic_archive};

/// A container of named entries that can be read individually.
///
/// Implementations must tolerate a failing read: one entry failing leaves
/// every other entry readable.
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Returns a short description of the source kind.
    fn name(&self) -> &'static str;

    /// Returns every file entry path, in the container's own order.
    fn entry_paths(&self) -> &[String];

    /// Reads one entry's full content.
    async fn read_entry(&self, path: &str) -> Result<Vec<u8>, EntryReadError>;
}

/// A listed entry whose content has not been loaded yet.
#[derive(Clone, Copy)]
pub struct RawEntry<'a> {
    path: &'a str,
    source: &'a dyn EntrySource,
}

impl<'a> RawEntry<'a> {
    /// Returns the entry path.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Reads the entry content from its source.
    pub async fn load(&self) -> Result<Vec<u8>, EntryReadError> {
        self.source.read_entry(self.path).await
    }
}

impl std::fmt::Debug for RawEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawEntry")
            .field("path", &self.path)
            .field("source", &self.source.name())
            .finish()
    }
}

impl<'s> dyn EntrySource + 's {
    /// Iterates over lazily loadable entries.
    pub fn entries(&self) -> impl Iterator<Item = RawEntry<'_>> {
        self.entry_paths().iter().map(move |path| RawEntry {
            path,
            source: self,
        })
    }

    /// Returns a lazily loadable handle for one path.
    pub fn entry<'a>(&'a self, path: &'a str) -> RawEntry<'a> {
        RawEntry { path, source: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entries_load_lazily_in_listing_order() {
        let bytes = build_synthetic_archive(
            "messages/inbox",
            "kai",
            [&b"{\"a\": 1}"[..], &b"{\"b\": 2}"[..]],
        )
        .unwrap();
        let reader = ZipArchiveReader::open(bytes).unwrap();
        let source: &dyn EntrySource = &reader;

        let entries: Vec<RawEntry<'_>> = source.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].path(), "messages/inbox/kai/message_2.json");
        assert_eq!(entries[1].load().await.unwrap(), b"{\"b\": 2}");
        assert!(format!("{:?}", entries[0]).contains("zip"));
    }
}
