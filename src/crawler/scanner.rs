//! Author scanner
//!
//! Scanning an author is the unit of work run on the worker pool:
//! 1. Fetch the starred page and collect the authors of starred books
//! 2. Fetch the owned page and store the author's shelf in the catalog
//!
//! A rejected page (non-success status) blacklists the author. Anything else
//! that goes wrong, panics included, is an unexpected failure: it is logged
//! but the author is neither blacklisted nor resolved, which leaves it to the
//! scheduler's re-queue pass.

use crate::crawler::fetcher::{PageFetcher, PageKind};
use crate::crawler::parser::{books_by_title, discovered_authors, parse_items, PageItem};
use crate::state::Blacklist;
use crate::storage::{Catalog, ErrorLog};
use crate::AuthorId;
use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;

/// Why a scan did not resolve its author
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The platform answered with a non-success status
    #[error("profile of {author} rejected: {url} returned HTTP {status}")]
    Rejected {
        author: AuthorId,
        url: String,
        status: u16,
    },

    /// Network failure, malformed payload, or a panic during the scan
    #[error("scan of {author} failed at {url}: {message}")]
    Unexpected {
        author: AuthorId,
        url: String,
        message: String,
    },
}

impl ScanError {
    pub fn author(&self) -> &str {
        match self {
            Self::Rejected { author, .. } | Self::Unexpected { author, .. } => author,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Context lines written to the error log
    fn log_lines(&self) -> Vec<String> {
        match self {
            Self::Rejected {
                author,
                url,
                status,
            } => vec![author.clone(), url.clone(), status.to_string()],
            Self::Unexpected {
                author,
                url,
                message,
            } => vec![author.clone(), url.clone(), message.clone()],
        }
    }
}

/// Result of one scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub author: AuthorId,

    /// Authors of the books this author starred. Filled in as soon as the
    /// starred page parsed, so it survives a later owned-page failure.
    pub discovered: BTreeSet<AuthorId>,

    /// Number of books stored for the author, or why nothing was stored
    pub result: Result<usize, ScanError>,
}

impl ScanOutcome {
    pub fn is_resolved(&self) -> bool {
        self.result.is_ok()
    }
}

/// State carried through a scan so a failure can report where it happened
#[derive(Debug, Default)]
struct ScanTrace {
    discovered: BTreeSet<AuthorId>,
    url: String,
}

/// Scans single authors against shared crawl state
pub struct AuthorScanner {
    fetcher: Arc<dyn PageFetcher>,
    catalog: Arc<Catalog>,
    blacklist: Arc<Blacklist>,
    error_log: Arc<ErrorLog>,
}

impl AuthorScanner {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        catalog: Arc<Catalog>,
        blacklist: Arc<Blacklist>,
        error_log: Arc<ErrorLog>,
    ) -> Self {
        Self {
            fetcher,
            catalog,
            blacklist,
            error_log,
        }
    }

    /// Scans one author
    ///
    /// Never fails as a whole: the outcome carries the discovered authors and
    /// the per-author result.
    pub async fn scan(&self, author: &str) -> ScanOutcome {
        let mut trace = ScanTrace::default();

        let attempt = AssertUnwindSafe(self.try_scan(author, &mut trace))
            .catch_unwind()
            .await;

        let result = match attempt {
            Ok(result) => result,
            Err(panic) => Err(ScanError::Unexpected {
                author: author.to_string(),
                url: trace.url.clone(),
                message: format!("panicked: {}", panic_message(panic.as_ref())),
            }),
        };

        match &result {
            Ok(books) => {
                tracing::debug!(author = %author, books, "Resolved author");
            }
            Err(error @ ScanError::Rejected { status, url, .. }) => {
                self.blacklist.insert(author);
                tracing::warn!(author = %author, status, url = %url, "Profile rejected");
                self.error_log.record(&error.log_lines());
            }
            Err(error @ ScanError::Unexpected { message, url, .. }) => {
                tracing::warn!(author = %author, url = %url, "Scan failed: {}", message);
                self.error_log.record(&error.log_lines());
            }
        }

        ScanOutcome {
            author: author.to_string(),
            discovered: trace.discovered,
            result,
        }
    }

    async fn try_scan(&self, author: &str, trace: &mut ScanTrace) -> Result<usize, ScanError> {
        let starred = self.fetch_items(author, PageKind::Starred, trace).await?;
        trace.discovered = discovered_authors(&starred);

        let owned = self.fetch_items(author, PageKind::Owned, trace).await?;
        let shelf = books_by_title(&owned);
        let books = shelf.len();
        self.catalog.insert_author(author, shelf);

        Ok(books)
    }

    async fn fetch_items(
        &self,
        author: &str,
        kind: PageKind,
        trace: &mut ScanTrace,
    ) -> Result<Vec<PageItem>, ScanError> {
        trace.url = self.fetcher.page_url(author, kind);

        let response = self
            .fetcher
            .fetch_page(author, kind)
            .await
            .map_err(|e| ScanError::Unexpected {
                author: author.to_string(),
                url: e.url,
                message: e.message,
            })?;

        if !response.is_success() {
            return Err(ScanError::Rejected {
                author: author.to_string(),
                url: response.url,
                status: response.status_code,
            });
        }

        parse_items(&response.body, kind).map_err(|e| ScanError::Unexpected {
            author: author.to_string(),
            url: response.url,
            message: format!("unreadable {} page: {}", kind, e),
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
