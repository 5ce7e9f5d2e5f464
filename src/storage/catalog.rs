//! Catalog data model
//!
//! The catalog maps each resolved author to the books they own, keyed by
//! title. It is shared by every scan task; writes are partitioned by author so
//! a single lock around the map is enough.

use crate::AuthorId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Books owned by one author, keyed by title
pub type Shelf = BTreeMap<String, Book>;

/// Serialized shape of the catalog: author -> title -> book
pub type CatalogData = BTreeMap<AuthorId, Shelf>;

/// A publicly listed book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: AuthorId,
    #[serde(default)]
    pub urls: BookUrls,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub subscriptions: u64,
}

impl Book {
    pub fn access_url(&self) -> &str {
        &self.urls.access
    }

    pub fn download_urls(&self) -> &DownloadUrls {
        &self.urls.download
    }
}

/// Where a book can be read and downloaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookUrls {
    pub access: String,
    pub download: DownloadUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadUrls {
    pub mobi: String,
    pub epub: String,
    pub pdf: String,
}

/// Concurrency-safe catalog shared across scan tasks
#[derive(Debug, Default)]
pub struct Catalog {
    shelves: RwLock<CatalogData>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: CatalogData) -> Self {
        Self {
            shelves: RwLock::new(data),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogData> {
        self.shelves
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogData> {
        self.shelves
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stores an author's shelf, replacing any previous one
    ///
    /// Returns the replaced shelf, if any.
    pub fn insert_author(&self, author: &str, shelf: Shelf) -> Option<Shelf> {
        self.write().insert(author.to_string(), shelf)
    }

    /// True once the author has a catalog entry (resolved)
    pub fn contains(&self, author: &str) -> bool {
        self.read().contains_key(author)
    }

    pub fn shelf(&self, author: &str) -> Option<Shelf> {
        self.read().get(author).cloned()
    }

    pub fn authors(&self) -> BTreeSet<AuthorId> {
        self.read().keys().cloned().collect()
    }

    /// Number of resolved authors
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn book_count(&self) -> usize {
        self.read().values().map(|shelf| shelf.len()).sum()
    }

    /// Copy of the current contents, suitable for persisting
    pub fn snapshot(&self) -> CatalogData {
        self.read().clone()
    }

    pub fn into_data(self) -> CatalogData {
        self.shelves
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
