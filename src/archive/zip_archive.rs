//! Zip-backed entry source.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use zip::result::{ZipError, ZipResult};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::EntrySource;
use crate::config::DEFAULT_MAX_ENTRY_SIZE;
use crate::error::{EntryReadError, IngestError, Result};

/// Where the archive bytes live.
#[derive(Debug, Clone)]
enum Backing {
    /// Cloned per read; the parsed index is shared, only the cursor is copied.
    Memory(ZipArchive<Cursor<Arc<[u8]>>>),
    /// One open file handle, read by one entry at a time.
    File(Arc<Mutex<ZipArchive<File>>>),
}

/// Reads an export `.zip`, either from memory or from a file on disk.
///
/// Opening parses only the central directory. Each
/// [`read_entry`](EntrySource::read_entry) decompresses a single entry on
/// tokio's blocking pool. A file-backed reader never holds more than one
/// entry in memory, whatever the size of the archive.
#[derive(Debug)]
pub struct ZipArchiveReader {
    backing: Backing,
    paths: Vec<String>,
    max_entry_size: u64,
}

impl ZipArchiveReader {
    /// Opens a zip blob.
    ///
    /// Fails with [`IngestError::Format`] if the blob is not a readable zip.
    pub fn open(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes.into()))
            .map_err(|e| IngestError::zip_format(e, None))?;
        let paths = list_entries(&mut archive, None)?;

        tracing::debug!(entries = paths.len(), "Opened zip archive");

        Ok(Self {
            backing: Backing::Memory(archive),
            paths,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        })
    }

    /// Opens a zip file on disk without loading it.
    ///
    /// Fails with [`IngestError::Io`] if the file cannot be opened and with
    /// [`IngestError::Format`] if it is not a readable zip.
    pub async fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let task_path = path.clone();
        let (archive, paths) = tokio::task::spawn_blocking(move || open_file(&task_path))
            .await
            .map_err(|e| IngestError::Io(std::io::Error::other(e)))??;

        tracing::debug!(
            path = %path.display(),
            entries = paths.len(),
            "Opened zip archive from disk"
        );

        Ok(Self {
            backing: Backing::File(Arc::new(Mutex::new(archive))),
            paths,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        })
    }

    /// Sets the largest entry that will be decompressed.
    #[must_use]
    pub fn with_max_entry_size(mut self, size: u64) -> Self {
        self.max_entry_size = size;
        self
    }
}

fn open_file(path: &Path) -> Result<(ZipArchive<File>, Vec<String>)> {
    let file = File::open(path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| IngestError::zip_format(e, Some(path.to_path_buf())))?;
    let paths = list_entries(&mut archive, Some(path))?;
    Ok((archive, paths))
}

fn list_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&Path>,
) -> Result<Vec<String>> {
    let mut paths = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| IngestError::zip_format(e, path.map(Path::to_path_buf)))?;
        if !entry.is_dir() {
            paths.push(entry.name().to_string());
        }
    }
    Ok(paths)
}

#[async_trait]
impl EntrySource for ZipArchiveReader {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn entry_paths(&self) -> &[String] {
        &self.paths
    }

    async fn read_entry(&self, path: &str) -> std::result::Result<Vec<u8>, EntryReadError> {
        let backing = self.backing.clone();
        let max_size = self.max_entry_size;
        let task_path = path.to_string();

        tokio::task::spawn_blocking(move || match backing {
            Backing::Memory(mut archive) => read_zip_entry(&mut archive, &task_path, max_size),
            Backing::File(shared) => {
                // A failed read leaves the archive index intact.
                let mut archive = shared.lock().unwrap_or_else(PoisonError::into_inner);
                read_zip_entry(&mut *archive, &task_path, max_size)
            }
        })
        .await
        .map_err(|source| EntryReadError::Interrupted {
            path: path.to_string(),
            source,
        })?
    }
}

fn read_zip_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    max_size: u64,
) -> std::result::Result<Vec<u8>, EntryReadError> {
    let file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(EntryReadError::Missing {
                path: path.to_string(),
            });
        }
        Err(source) => {
            return Err(EntryReadError::Decompress {
                path: path.to_string(),
                source,
            });
        }
    };

    let too_large = |size| EntryReadError::TooLarge {
        path: path.to_string(),
        size,
        max_size,
    };

    // Declared sizes can lie, so the read itself is bounded too.
    if file.size() > max_size {
        return Err(too_large(file.size()));
    }
    let mut content = Vec::with_capacity(file.size() as usize);
    file.take(max_size.saturating_add(1))
        .read_to_end(&mut content)
        .map_err(|source| EntryReadError::Io {
            path: path.to_string(),
            source,
        })?;
    if content.len() as u64 > max_size {
        return Err(too_large(content.len() as u64));
    }

    Ok(content)
}

/// Packages loose pages into an in-memory zip with one conversation folder.
///
/// Pages are stored as `<root>/<folder_key>/message_<N>.json`, numbered from
/// 1 in the order given, so the first page becomes the canonical one.
pub fn build_synthetic_archive<'a>(
    root: &str,
    folder_key: &str,
    pages: impl IntoIterator<Item = &'a [u8]>,
) -> ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, page) in pages.into_iter().enumerate() {
        writer.start_file(
            format!("{root}/{folder_key}/message_{}.json", index + 1),
            options,
        )?;
        writer.write_all(page)?;
    }

    Ok(writer.finish()?.into_inner())
}
