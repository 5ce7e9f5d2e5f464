//! Statistics over a stored catalog
//!
//! This module provides functionality for summarizing a catalog and
//! displaying the summary on stdout.

use crate::config::SortKey;
use crate::output::markdown::rank_books;
use crate::storage::{CatalogData, CatalogStore};
use crate::AuthorId;

/// Number of books listed under "Top books"
const TOP_BOOKS: usize = 10;

/// One line of the top-books listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopBook {
    pub title: String,
    pub author: AuthorId,
    pub count: u64,
}

/// Catalog statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatistics {
    /// Authors with a catalog entry
    pub total_authors: usize,

    /// Authors that own no books
    pub empty_authors: usize,

    /// Books across all authors
    pub total_books: usize,

    /// Stars summed over all books
    pub total_stars: u64,

    /// Subscriptions summed over all books
    pub total_subscriptions: u64,

    /// Count the top books are ranked by
    pub sort_key: SortKey,

    /// Highest ranked books, best first
    pub top_books: Vec<TopBook>,
}

impl CatalogStatistics {
    /// Summarizes a catalog
    pub fn from_catalog(catalog: &CatalogData, sort_key: SortKey) -> Self {
        let books = || catalog.values().flat_map(|shelf| shelf.values());

        let top_books = rank_books(catalog, sort_key)
            .into_iter()
            .take(TOP_BOOKS)
            .map(|book| TopBook {
                title: book.title.clone(),
                author: book.author.clone(),
                count: match sort_key {
                    SortKey::Stars => book.stars,
                    SortKey::Subscriptions => book.subscriptions,
                },
            })
            .collect();

        Self {
            total_authors: catalog.len(),
            empty_authors: catalog.values().filter(|shelf| shelf.is_empty()).count(),
            total_books: books().count(),
            total_stars: books().map(|book| book.stars).sum(),
            total_subscriptions: books().map(|book| book.subscriptions).sum(),
            sort_key,
            top_books,
        }
    }

    pub fn books_per_author(&self) -> f64 {
        if self.total_authors == 0 {
            0.0
        } else {
            self.total_books as f64 / self.total_authors as f64
        }
    }
}

/// Loads statistics from a catalog store
///
/// A missing or unreadable catalog yields empty statistics.
pub fn load_statistics(store: &dyn CatalogStore, sort_key: SortKey) -> CatalogStatistics {
    CatalogStatistics::from_catalog(&store.load_catalog_or_empty(), sort_key)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Authors resolved: {}", stats.total_authors);
    println!("  Authors without books: {}", stats.empty_authors);
    println!("  Books: {}", stats.total_books);
    println!("  Books per author: {:.1}", stats.books_per_author());
    println!("  Total stars: {}", stats.total_stars);
    println!("  Total subscriptions: {}", stats.total_subscriptions);
    println!();

    if !stats.top_books.is_empty() {
        println!("Top Books by {}:", stats.sort_key);
        for (rank, book) in stats.top_books.iter().enumerate() {
            println!(
                "  {:>2}. {} by {} ({})",
                rank + 1,
                book.title,
                book.author,
                book.count
            );
        }
    }
}
