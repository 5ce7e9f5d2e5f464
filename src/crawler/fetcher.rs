//! HTTP fetcher implementation
//!
//! This module handles the two page fetches made per author:
//! - Building the HTTP client (no redirects, bounded timeout)
//! - Building the starred/owned page URL for an author
//! - Classifying network failures
//!
//! Status codes are passed through untouched; deciding what a non-success
//! status means is the scanner's job.

use crate::config::SourceConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which of an author's pages to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Books the author starred (used to discover other authors)
    Starred,

    /// Books the author owns (stored in the catalog)
    Owned,
}

impl PageKind {
    /// Path suffix appended to the author's profile path
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Starred => "/starred",
            Self::Owned => "",
        }
    }

    /// Property of the page payload holding the item list
    pub fn field(&self) -> &'static str {
        match self {
            Self::Starred => "starred",
            Self::Owned => "books",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starred => "starred",
            Self::Owned => "owned",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page response, successful or not
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// URL that was requested
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Response body
    pub body: String,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// The request never produced a response (timeout, refused connection, ...)
#[derive(Debug, Clone, Error)]
#[error("request to {url} failed: {message}")]
pub struct FetchError {
    pub url: String,
    pub message: String,
}

/// Source of author pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// URL the given page is fetched from
    fn page_url(&self, author: &str, kind: PageKind) -> String;

    /// Fetches one of an author's pages
    async fn fetch_page(&self, author: &str, kind: PageKind) -> Result<PageResponse, FetchError>;
}

/// Builds an HTTP client for author page fetches
///
/// Redirects are not followed: a profile that redirects is treated the same as
/// any other non-success status.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("bookcase/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches author pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(source: &SourceConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(timeout)?, &source.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn page_url(&self, author: &str, kind: PageKind) -> String {
        format!("{}/@{}{}?q=", self.base_url, author, kind.suffix())
    }

    async fn fetch_page(&self, author: &str, kind: PageKind) -> Result<PageResponse, FetchError> {
        let url = self.page_url(author, kind);
        tracing::trace!(author = %author, page = %kind, "Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .header("x-pjax", "true")
            .header("accept", "*/*")
            .send()
            .await
            .map_err(|e| FetchError {
                url: url.clone(),
                message: describe_error(&e),
            })?;

        let status_code = response.status().as_u16();
        let body = response.text().await.map_err(|e| FetchError {
            url: url.clone(),
            message: describe_error(&e),
        })?;

        Ok(PageResponse {
            url,
            status_code,
            body,
        })
    }
}

/// Classifies a reqwest failure into a short description
fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
