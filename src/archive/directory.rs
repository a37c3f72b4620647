//! Entry source over an extracted export directory.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use walkdir::WalkDir;

use super::EntrySource;
use crate::config::DEFAULT_MAX_ENTRY_SIZE;
use crate::error::{EntryReadError, IngestError, Result};

/// An export that was unzipped to disk.
///
/// Entry paths are relative to the directory and `/`-separated. Siblings are
/// sorted with digit runs compared by value, so `message_2.json` comes before
/// `message_10.json` and the listing is stable across platforms and runs.
///
/// Subdirectories that cannot be walked are logged and left out; only an
/// unreadable root fails the open.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
    paths: Vec<String>,
    listed: HashSet<String>,
    max_entry_size: u64,
}

impl DirectoryArchive {
    /// Walks `root` and lists every regular file below it.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let walk_root = root.clone();
        let paths = tokio::task::spawn_blocking(move || list_files(&walk_root))
            .await
            .map_err(|e| IngestError::Io(std::io::Error::other(e)))??;

        tracing::debug!(root = %root.display(), entries = paths.len(), "Opened export directory");

        let listed = paths.iter().cloned().collect();
        Ok(Self {
            root,
            paths,
            listed,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        })
    }

    /// Sets the largest entry that will be read.
    #[must_use]
    pub fn with_max_entry_size(mut self, size: u64) -> Self {
        self.max_entry_size = size;
        self
    }
}

fn list_files(root: &Path) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(root).sort_by(|a, b| {
        natural_cmp(&a.file_name().to_string_lossy(), &b.file_name().to_string_lossy())
    });
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(IngestError::directory_format(e, root.to_path_buf()));
            }
            Err(e) => {
                tracing::warn!(
                    path = ?e.path(),
                    error = %e,
                    "Skipping unreadable part of export directory"
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            let segments: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect();
            paths.push(segments.join("/"));
        }
    }
    Ok(paths)
}

/// Compares names with runs of ASCII digits ordered by numeric value.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (digits_a, rest_a) = split_digits(a);
                let (digits_b, rest_b) = split_digits(b);
                let value_a = digits_a.trim_start_matches('0');
                let value_b = digits_b.trim_start_matches('0');
                let order = value_a
                    .len()
                    .cmp(&value_b.len())
                    .then_with(|| value_a.cmp(value_b))
                    .then_with(|| digits_a.len().cmp(&digits_b.len()));
                if order != Ordering::Equal {
                    return order;
                }
                a = rest_a;
                b = rest_b;
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a = &a[x.len_utf8()..];
                b = &b[y.len_utf8()..];
            }
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

#[async_trait]
impl EntrySource for DirectoryArchive {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn entry_paths(&self) -> &[String] {
        &self.paths
    }

    async fn read_entry(&self, path: &str) -> std::result::Result<Vec<u8>, EntryReadError> {
        // Only listed paths are readable; this also keeps reads inside `root`.
        if !self.listed.contains(path) {
            return Err(EntryReadError::Missing {
                path: path.to_string(),
            });
        }

        let full_path = self.root.join(path);
        let io_error = |source| EntryReadError::Io {
            path: path.to_string(),
            source,
        };

        let size = tokio::fs::metadata(&full_path).await.map_err(io_error)?.len();
        if size > self.max_entry_size {
            return Err(EntryReadError::TooLarge {
                path: path.to_string(),
                size,
                max_size: self.max_entry_size,
            });
        }

        tokio::fs::read(&full_path).await.map_err(io_error)
    }
}
