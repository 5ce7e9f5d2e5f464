//! Markdown report generation
//!
//! Renders the catalog as a ranked markdown table: an introductory header,
//! a caption with the book count, sort key and generation time, then one row
//! per book.

use crate::config::SortKey;
use crate::output::error::{OutputError, OutputResult};
use crate::storage::{Book, CatalogData};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::fs;
use std::path::Path;

const HEADER: &str = "\
# Bookcase

Books reachable from the root author by following stars. The index is built in
four steps:

1. Collect authors from the root author's starred books.
2. Scan each author's own books, and use their starred books to collect more
   authors.
3. Repeat until no new authors turn up.
4. Rank every collected book.

Know a good author that is missing? Add them to `authors.json` and the next
run will pick them up.

";

const TABLE_HEAD: &str = "\
| Title | Author | Stars | Subscriptions | Download |
|:---|:---|:---:|:---:|:---|
";

/// Every book in the catalog, best first
///
/// Books are ordered by the chosen count, descending. Ties are broken by
/// title, then author, so the order is stable across runs.
pub fn rank_books(catalog: &CatalogData, sort_key: SortKey) -> Vec<&Book> {
    let mut ranking: Vec<&Book> = catalog.values().flat_map(|shelf| shelf.values()).collect();

    ranking.sort_by(|a, b| {
        Reverse(sort_value(a, sort_key))
            .cmp(&Reverse(sort_value(b, sort_key)))
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.author.cmp(&b.author))
    });

    ranking
}

fn sort_value(book: &Book, sort_key: SortKey) -> u64 {
    match sort_key {
        SortKey::Stars => book.stars,
        SortKey::Subscriptions => book.subscriptions,
    }
}

/// Formats the catalog as a markdown report
///
/// # Arguments
///
/// * `catalog` - The catalog to render
/// * `sort_key` - Count used to rank books
/// * `profile_url` - Prefix that an author id is appended to for links
/// * `generated_at` - Time shown in the caption
pub fn format_markdown_report(
    catalog: &CatalogData,
    sort_key: SortKey,
    profile_url: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let ranking = rank_books(catalog, sort_key);

    let mut md = String::from(HEADER);
    md.push_str(&format!(
        "*{} books sort by {} @ {}*\n\n",
        ranking.len(),
        sort_key,
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(TABLE_HEAD);

    for book in ranking {
        md.push_str(&format_row(book, profile_url));
    }

    md
}

fn format_row(book: &Book, profile_url: &str) -> String {
    let downloads = book.download_urls();
    let download = format!(
        "[mobi]({}) | [epub]({}) | [pdf]({})",
        downloads.mobi, downloads.epub, downloads.pdf
    );

    format!(
        "| [{}]({}) | [{}]({}{}) | {} | {} | {} |\n",
        escape_cell(&book.title),
        book.access_url(),
        escape_cell(&book.author),
        profile_url,
        book.author,
        book.stars,
        book.subscriptions,
        escape_cell(&download)
    )
}

/// Escapes characters that would end a table cell early
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Writes the markdown report for the catalog
///
/// # Arguments
///
/// * `catalog` - The catalog to render
/// * `sort_key` - Count used to rank books
/// * `profile_url` - Prefix for author links
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_markdown_report(
    catalog: &CatalogData,
    sort_key: SortKey,
    profile_url: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(catalog, sort_key, profile_url, Utc::now());

    fs::write(output_path, markdown).map_err(|source| OutputError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;

    tracing::info!("Report written to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BookUrls, DownloadUrls, Shelf};
    use chrono::TimeZone;

    const PROFILE: &str = "https://legacy.gitbook.com/@";

    fn book(title: &str, author: &str, stars: u64, subscriptions: u64) -> Book {
        Book {
            title: title.to_string(),
            author: author.to_string(),
            urls: BookUrls {
                access: format!("https://example.com/{}", title),
                download: DownloadUrls {
                    mobi: format!("https://example.com/{}.mobi", title),
                    epub: format!("https://example.com/{}.epub", title),
                    pdf: format!("https://example.com/{}.pdf", title),
                },
            },
            stars,
            subscriptions,
        }
    }

    fn create_test_catalog() -> CatalogData {
        let mut catalog = CatalogData::new();
        catalog.insert(
            "alice".to_string(),
            Shelf::from([
                ("rust".to_string(), book("rust", "alice", 10, 1)),
                ("go".to_string(), book("go", "alice", 3, 7)),
            ]),
        );
        catalog.insert(
            "bob".to_string(),
            Shelf::from([("zig".to_string(), book("zig", "bob", 10, 2))]),
        );
        catalog.insert("carol".to_string(), Shelf::new());
        catalog
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_rank_by_stars() {
        let catalog = create_test_catalog();
        let titles: Vec<_> = rank_books(&catalog, SortKey::Stars)
            .into_iter()
            .map(|book| book.title.as_str())
            .collect();

        assert_eq!(titles, vec!["rust", "zig", "go"]);
    }

    #[test]
    fn test_rank_by_subscriptions() {
        let catalog = create_test_catalog();
        let titles: Vec<_> = rank_books(&catalog, SortKey::Subscriptions)
            .into_iter()
            .map(|book| book.title.as_str())
            .collect();

        assert_eq!(titles, vec!["go", "zig", "rust"]);
    }

    #[test]
    fn test_rank_empty_catalog() {
        assert!(rank_books(&CatalogData::new(), SortKey::Stars).is_empty());
    }

    #[test]
    fn test_format_markdown_report() {
        let catalog = create_test_catalog();
        let markdown = format_markdown_report(&catalog, SortKey::Stars, PROFILE, generated_at());

        assert!(markdown.starts_with("# Bookcase"));
        assert!(markdown.contains("*3 books sort by stars @ 2024-01-02 03:04:05*"));
        assert!(markdown.contains("| Title | Author | Stars | Subscriptions | Download |"));
        assert!(markdown.contains("|:---|:---|:---:|:---:|:---|"));
        assert!(markdown.contains(
            "| [rust](https://example.com/rust) | [alice](https://legacy.gitbook.com/@alice) | 10 | 1 |"
        ));
        assert!(markdown.contains(
            "[mobi](https://example.com/zig.mobi) \\| [epub](https://example.com/zig.epub) \\| [pdf](https://example.com/zig.pdf)"
        ));
    }

    #[test]
    fn test_rows_follow_ranking() {
        let catalog = create_test_catalog();
        let markdown = format_markdown_report(&catalog, SortKey::Stars, PROFILE, generated_at());

        let rust = markdown.find("[rust]").unwrap();
        let zig = markdown.find("[zig]").unwrap();
        let go = markdown.find("[go]").unwrap();
        assert!(rust < zig && zig < go);
    }

    #[test]
    fn test_pipes_in_titles_are_escaped() {
        let mut catalog = CatalogData::new();
        catalog.insert(
            "dave".to_string(),
            Shelf::from([("a|b".to_string(), book("a|b", "dave", 1, 0))]),
        );

        let markdown = format_markdown_report(&catalog, SortKey::Stars, PROFILE, generated_at());

        assert!(markdown.contains("[a\\|b]"));
        assert!(markdown.contains("*1 books sort by stars"));
    }

    #[test]
    fn test_write_markdown_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");

        write_markdown_report(&create_test_catalog(), SortKey::Subscriptions, PROFILE, &path)
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("sort by subscriptions"));
        assert!(written.contains("[go]"));
    }

    #[test]
    fn test_write_markdown_report_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("README.md");

        let result = write_markdown_report(&CatalogData::new(), SortKey::Stars, PROFILE, &path);

        assert!(matches!(result, Err(OutputError::Write { .. })));
    }
}
