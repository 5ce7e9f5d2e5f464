//! Configuration module for Bookcase
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) yields a
//! usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use bookcase::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("bookcase.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SortKey, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
