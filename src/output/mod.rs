//! Output module for presenting the catalog
//!
//! This module handles:
//! - Ranking books and rendering the markdown report
//! - Summarizing a stored catalog as statistics

mod error;
mod markdown;
pub mod stats;

pub use error::{OutputError, OutputResult};
pub use markdown::{format_markdown_report, rank_books, write_markdown_report};
pub use stats::{load_statistics, print_statistics, CatalogStatistics, TopBook};
