use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Bookcase
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Author the crawl always starts from unless already resolved
    pub root_author: String,

    /// Width of the scan worker pool
    pub workers: u32,

    /// Timeout applied to each page fetch (seconds)
    pub request_timeout_secs: u64,

    /// How many times an unresolved author may be re-queued before it is
    /// abandoned. `None` keeps re-queuing until the author resolves.
    pub max_requeues: Option<u32>,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_author: "captainvincent".to_string(),
            workers: 20,
            request_timeout_secs: 10,
            max_requeues: None,
        }
    }
}

/// Remote platform configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Base URL author pages are resolved against
    pub base_url: String,

    /// Prefix of an author's public profile, used for report links
    pub profile_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://legacy.gitbook.com".to_string(),
            profile_url: "https://legacy.gitbook.com/@".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the JSON catalog (author -> title -> book)
    pub catalog_path: PathBuf,

    /// Path to the JSON list of known authors
    pub authors_path: PathBuf,

    /// Path to the append-only scan error log
    pub error_log_path: PathBuf,

    /// Path to the markdown report
    pub report_path: PathBuf,

    /// Field the report is ranked by
    pub sort_key: SortKey,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("bookcase.json"),
            authors_path: PathBuf::from("authors.json"),
            error_log_path: PathBuf::from("error.log"),
            report_path: PathBuf::from("README.md"),
            sort_key: SortKey::Stars,
        }
    }
}

/// Numeric book field used for ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Stars,
    Subscriptions,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stars => "stars",
            Self::Subscriptions => "subscriptions",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
