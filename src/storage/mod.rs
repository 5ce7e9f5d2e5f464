//! Storage module for persisting crawl data
//!
//! This module handles everything the crawler keeps on disk:
//! - The catalog (author -> title -> book), shared in memory during a crawl
//! - The list of known authors that seeds the next run
//! - The append-only scan error log

mod catalog;
mod error_log;
mod json;
mod traits;

pub use catalog::{Book, BookUrls, Catalog, CatalogData, DownloadUrls, Shelf};
pub use error_log::ErrorLog;
pub use json::{read_json, write_json_atomic, JsonStore};
pub use traits::{CatalogStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the JSON store at the given catalog and author-list paths
pub fn open_storage(catalog_path: &Path, authors_path: &Path) -> JsonStore {
    JsonStore::new(catalog_path, authors_path)
}
