//! Parser for author page payloads
//!
//! An author page is a JSON document whose `props` object carries the item
//! list under a page-specific key (`starred` or `books`). This module extracts:
//! - The items themselves
//! - The distinct authors of starred items (newly discovered authors)
//! - The per-title book shelf of owned items

use crate::crawler::fetcher::PageKind;
use crate::storage::{Book, BookUrls, Shelf};
use crate::AuthorId;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised while decoding a page payload
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload has no `props.{0}` list")]
    MissingList(&'static str),
}

/// One item listed on an author page
#[derive(Debug, Clone, Deserialize)]
pub struct PageItem {
    pub title: String,
    pub author: ItemAuthor,
    #[serde(default)]
    pub urls: BookUrls,
    #[serde(default)]
    pub counts: ItemCounts,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemAuthor {
    pub username: AuthorId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemCounts {
    pub stars: u64,
    pub subscriptions: u64,
}

/// Decodes the item list of a page body
///
/// # Example
///
/// ```
/// use bookcase::crawler::{parse_items, PageKind};
///
/// let body = r#"{"props": {"starred": [{"title": "X", "author": {"username": "bob"}}]}}"#;
/// let items = parse_items(body, PageKind::Starred).unwrap();
/// assert_eq!(items[0].author.username, "bob");
/// ```
pub fn parse_items(body: &str, kind: PageKind) -> Result<Vec<PageItem>, ParseError> {
    let mut payload: Value = serde_json::from_str(body)?;
    let list = payload
        .get_mut("props")
        .and_then(|props| props.get_mut(kind.field()))
        .map(Value::take)
        .ok_or(ParseError::MissingList(kind.field()))?;

    Ok(serde_json::from_value(list)?)
}

/// Distinct authors of the given items
pub fn discovered_authors(items: &[PageItem]) -> BTreeSet<AuthorId> {
    items
        .iter()
        .map(|item| item.author.username.clone())
        .collect()
}

/// Builds a title-keyed shelf; a repeated title keeps the last item
pub fn books_by_title(items: &[PageItem]) -> Shelf {
    items
        .iter()
        .map(|item| {
            let book = Book {
                title: item.title.clone(),
                author: item.author.username.clone(),
                urls: item.urls.clone(),
                stars: item.counts.stars,
                subscriptions: item.counts.subscriptions,
            };
            (item.title.clone(), book)
        })
        .collect()
}
