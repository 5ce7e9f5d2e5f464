//! JSON file storage implementation
//!
//! Each record lives in its own pretty-printed JSON file. Writes go through a
//! temporary file in the destination directory which is flushed, synced and
//! then renamed over the destination, so readers only ever see the previous
//! or the new content.

use crate::storage::traits::{CatalogStore, StorageError, StorageResult};
use crate::storage::CatalogData;
use crate::AuthorId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON file storage backend
#[derive(Debug, Clone)]
pub struct JsonStore {
    catalog_path: PathBuf,
    authors_path: PathBuf,
}

impl JsonStore {
    /// Creates a store over the given catalog and author-list files
    ///
    /// Nothing is touched on disk until the first save.
    pub fn new(catalog_path: impl Into<PathBuf>, authors_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            authors_path: authors_path.into(),
        }
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn authors_path(&self) -> &Path {
        &self.authors_path
    }
}

impl CatalogStore for JsonStore {
    fn load_catalog(&self) -> StorageResult<CatalogData> {
        read_json(&self.catalog_path)
    }

    fn save_catalog(&self, catalog: &CatalogData) -> StorageResult<()> {
        write_json_atomic(&self.catalog_path, catalog)
    }

    fn load_authors(&self) -> StorageResult<Vec<AuthorId>> {
        read_json(&self.authors_path)
    }

    fn save_authors(&self, authors: &[AuthorId]) -> StorageResult<()> {
        write_json_atomic(&self.authors_path, authors)
    }
}

/// Reads and deserializes a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let file = File::open(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| StorageError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes a value and atomically replaces `path` with it
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let staged = stage_json(path, value)?;
    commit(staged, path)
}

/// Writes the value to a synced temporary file next to `path`
///
/// The destination is not touched. Dropping the returned file removes it.
fn stage_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<NamedTempFile> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Same directory as the destination so the rename stays on one filesystem.
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(io_err)?;

    let prefix = format!(
        "temp_{}",
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    let mut staged = tempfile::Builder::new()
        .prefix(&prefix)
        .tempfile_in(parent)
        .map_err(io_err)?;

    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|source| StorageError::Serialization {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(io_err)?;
    }

    staged.as_file().sync_all().map_err(io_err)?;
    Ok(staged)
}

/// Renames a staged file over the destination
fn commit(staged: NamedTempFile, path: &Path) -> StorageResult<()> {
    staged
        .persist(path)
        .map_err(|e| StorageError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}
