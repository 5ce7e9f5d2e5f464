//! Crawler module for following the star graph
//!
//! This module contains the core crawling logic, including:
//! - Fetching author pages from the source
//! - Parsing page payloads into books and discovered authors
//! - Scanning a single author and classifying failures
//! - Scheduling scans on a bounded worker pool until convergence
//! - Overall crawl coordination and persistence

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod progress;
mod scanner;
mod scheduler;

pub use coordinator::{run_crawl, seed_frontier, Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, FetchError, HttpFetcher, PageFetcher, PageKind, PageResponse,
};
pub use frontier::Frontier;
pub use parser::{books_by_title, discovered_authors, parse_items, PageItem, ParseError};
pub use progress::{Progress, ProgressSnapshot};
pub use scanner::{AuthorScanner, ScanError, ScanOutcome};
pub use scheduler::{ScheduleSummary, Scheduler};
