//! Storage traits and error types
//!
//! This module defines the trait interface for catalog persistence backends
//! and associated error types.

use crate::storage::CatalogData;
use crate::AuthorId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error on {path}: {source}")]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Atomic replace of {path} failed: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable catalog backends
///
/// Backends hold two records: the catalog itself and the flat list of known
/// authors that seeds the next run. Writes must replace each record
/// atomically.
pub trait CatalogStore: Send + Sync {
    /// Reads the stored catalog
    fn load_catalog(&self) -> StorageResult<CatalogData>;

    /// Replaces the stored catalog
    fn save_catalog(&self, catalog: &CatalogData) -> StorageResult<()>;

    /// Reads the stored list of known authors
    fn load_authors(&self) -> StorageResult<Vec<AuthorId>>;

    /// Replaces the stored list of known authors
    fn save_authors(&self, authors: &[AuthorId]) -> StorageResult<()>;

    /// Reads the catalog, treating any failure as an empty catalog
    ///
    /// A missing file is the normal first-run case, so failures are only
    /// logged at debug level.
    fn load_catalog_or_empty(&self) -> CatalogData {
        self.load_catalog().unwrap_or_else(|e| {
            tracing::debug!("Starting with an empty catalog: {}", e);
            CatalogData::new()
        })
    }

    /// Reads the author list, treating any failure as an empty list
    fn load_authors_or_empty(&self) -> Vec<AuthorId> {
        self.load_authors().unwrap_or_else(|e| {
            tracing::debug!("Starting with no known authors: {}", e);
            Vec::new()
        })
    }
}
