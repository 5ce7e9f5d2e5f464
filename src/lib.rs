//! Bookcase: a star-graph book crawler
//!
//! This crate discovers publicly listed books by following the "starred"
//! relation between authors. Starting from a root author, every scanned author
//! contributes their own books to the catalog and the authors of the books they
//! starred to the frontier, until no new authors remain reachable.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Opaque, case-sensitive author identifier
pub type AuthorId = String;

/// Main error type for Bookcase operations
#[derive(Debug, Error)]
pub enum BookcaseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Bookcase operations
pub type Result<T> = std::result::Result<T, BookcaseError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport, ScanError};
pub use state::{AuthorState, Blacklist};
pub use storage::{Book, Catalog};
