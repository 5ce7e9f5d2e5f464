//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end: HTTP fetching, scheduling, persistence and the
//! markdown report.

use bookcase::config::{Config, CrawlerConfig, OutputConfig, SortKey, SourceConfig};
use bookcase::crawler::{run_crawl, Progress};
use bookcase::output::write_markdown_report;
use bookcase::storage::{open_storage, CatalogStore};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            root_author: "alice".to_string(),
            workers: 4,
            request_timeout_secs: 5,
            max_requeues: Some(2),
        },
        source: SourceConfig {
            base_url: base_url.to_string(),
            profile_url: format!("{}/@", base_url),
        },
        output: OutputConfig {
            catalog_path: dir.join("bookcase.json"),
            authors_path: dir.join("authors.json"),
            error_log_path: dir.join("error.log"),
            report_path: dir.join("README.md"),
            sort_key: SortKey::Stars,
        },
    }
}

fn item(title: &str, author: &str, stars: u64) -> serde_json::Value {
    json!({
        "title": title,
        "author": {"username": author},
        "urls": {
            "access": format!("https://books.example/{}", title),
            "download": {
                "mobi": format!("https://books.example/{}.mobi", title),
                "epub": format!("https://books.example/{}.epub", title),
                "pdf": format!("https://books.example/{}.pdf", title)
            }
        },
        "counts": {"stars": stars, "subscriptions": 1}
    })
}

/// Mounts an author's starred and owned pages
async fn mount_author(
    server: &MockServer,
    author: &str,
    starred: Vec<serde_json::Value>,
    owned: Vec<serde_json::Value>,
    expected_scans: u64,
) {
    Mock::given(method("GET"))
        .and(path(format!("/@{}/starred", author)))
        .and(header("x-pjax", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"props": {"starred": starred}})))
        .expect(expected_scans)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/@{}", author)))
        .and(header("x-pjax", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"props": {"books": owned}})))
        .expect(expected_scans)
        .mount(server)
        .await;
}

fn hidden() -> Arc<Progress> {
    Arc::new(Progress::hidden())
}

#[tokio::test]
async fn test_full_crawl_follows_stars() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_author(
        &server,
        "alice",
        vec![item("X", "bob", 9)],
        vec![item("alice-guide", "alice", 2)],
        1,
    )
    .await;
    mount_author(&server, "bob", vec![], vec![item("X", "bob", 9)], 1).await;

    let config = create_test_config(&server.uri(), dir.path());
    let report = run_crawl(config.clone(), false, hidden()).await.unwrap();

    assert_eq!(report.resolved, 2);
    assert_eq!(report.books, 2);
    assert_eq!(report.submitted, 2);
    assert!(report.blacklisted.is_empty());
    assert!(report.is_persisted());

    let store = open_storage(&config.output.catalog_path, &config.output.authors_path);
    let catalog = store.load_catalog().unwrap();
    assert_eq!(catalog["bob"]["X"].stars, 9);
    assert_eq!(catalog["alice"]["alice-guide"].author, "alice");
    assert_eq!(store.load_authors().unwrap(), vec!["alice", "bob"]);

    write_markdown_report(
        &report.catalog,
        config.output.sort_key,
        &config.source.profile_url,
        &config.output.report_path,
    )
    .unwrap();
    let readme = std::fs::read_to_string(&config.output.report_path).unwrap();
    assert!(readme.contains("*2 books sort by stars @"));
    assert!(readme.find("[X]").unwrap() < readme.find("[alice-guide]").unwrap());
}

#[tokio::test]
async fn test_rejected_author_is_blacklisted() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // carol has no mocks, so every request for her profile is a 404
    mount_author(&server, "alice", vec![item("Y", "carol", 1)], vec![], 1).await;

    let config = create_test_config(&server.uri(), dir.path());
    let report = run_crawl(config.clone(), false, hidden()).await.unwrap();

    assert!(report.blacklisted.contains("carol"));
    assert!(!report.catalog.contains_key("carol"));
    assert_eq!(report.requeued, 0);
    assert!(report.is_persisted());

    let log = std::fs::read_to_string(&config.output.error_log_path).unwrap();
    assert!(log.contains("carol\n--\n"));
    assert!(log.contains("404"));
}

#[tokio::test]
async fn test_redirect_is_a_rejection() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_author(&server, "alice", vec![item("Z", "erin", 1)], vec![], 1).await;
    Mock::given(method("GET"))
        .and(path("/@erin/starred"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let report = run_crawl(config, false, hidden()).await.unwrap();

    assert!(report.blacklisted.contains("erin"));
    assert_eq!(report.resolved, 1);
}

#[tokio::test]
async fn test_malformed_page_is_requeued_until_cap() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_author(&server, "alice", vec![item("W", "dave", 1)], vec![], 1).await;
    Mock::given(method("GET"))
        .and(path("/@dave/starred"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        // First scan plus two re-queues
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let report = run_crawl(config, false, hidden()).await.unwrap();

    assert!(report.abandoned.contains("dave"));
    assert!(!report.blacklisted.contains("dave"));
    assert_eq!(report.requeued, 2);
    assert_eq!(report.resolved, 1);
}

#[tokio::test]
async fn test_rerun_resumes_without_rescanning() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Each page is served exactly once across both runs
    mount_author(&server, "alice", vec![item("X", "bob", 3)], vec![], 1).await;
    mount_author(&server, "bob", vec![], vec![item("X", "bob", 3)], 1).await;

    let config = create_test_config(&server.uri(), dir.path());
    let first = run_crawl(config.clone(), false, hidden()).await.unwrap();
    let second = run_crawl(config, false, hidden()).await.unwrap();

    assert_eq!(second.submitted, 0);
    assert_eq!(second.catalog, first.catalog);
}

#[tokio::test]
async fn test_fresh_run_rescans() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_author(&server, "alice", vec![], vec![item("A", "alice", 1)], 2).await;

    let config = create_test_config(&server.uri(), dir.path());
    run_crawl(config.clone(), false, hidden()).await.unwrap();
    let second = run_crawl(config, true, hidden()).await.unwrap();

    assert_eq!(second.submitted, 1);
    assert_eq!(second.resolved, 1);
}
