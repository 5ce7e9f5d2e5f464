//! Crawl coordinator - loads state, runs the scheduler, persists results
//!
//! A crawl run:
//! - Loads the stored catalog and known authors (unless starting fresh)
//! - Seeds the frontier with unresolved known authors and the root author
//! - Runs the scheduler to convergence
//! - Saves the catalog and the author list atomically

use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::progress::Progress;
use crate::crawler::scanner::AuthorScanner;
use crate::crawler::scheduler::Scheduler;
use crate::state::Blacklist;
use crate::storage::{open_storage, Catalog, CatalogData, CatalogStore, ErrorLog};
use crate::{AuthorId, BookcaseError};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Authors resolved in the catalog, including those carried over
    pub resolved: usize,

    /// Authors rejected by the source during this run
    pub blacklisted: BTreeSet<AuthorId>,

    /// Authors re-queued after completing unresolved, summed over passes
    pub requeued: usize,

    /// Authors dropped after exceeding `max-requeues`
    pub abandoned: BTreeSet<AuthorId>,

    /// Scans submitted during this run
    pub submitted: usize,

    /// Total books across all resolved authors
    pub books: usize,

    pub catalog_saved: bool,
    pub authors_saved: bool,
    pub duration: Duration,

    /// The catalog as saved
    pub catalog: CatalogData,
}

impl CrawlReport {
    /// True when both durable records were written
    pub fn is_persisted(&self) -> bool {
        self.catalog_saved && self.authors_saved
    }
}

/// Main crawl coordinator
pub struct Coordinator {
    config: Config,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn CatalogStore>,
    progress: Arc<Progress>,
    fresh: bool,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Source of author pages
    /// * `store` - Durable catalog and author list
    /// * `progress` - Progress display updated during the crawl
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn CatalogStore>,
        progress: Arc<Progress>,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
            progress,
            fresh: false,
        }
    }

    /// Ignore stored state and start from an empty catalog
    pub fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    /// Loads the stored catalog and known authors
    fn load_state(&self) -> (CatalogData, Vec<AuthorId>) {
        if self.fresh {
            tracing::info!("Starting fresh, ignoring stored catalog");
            return (CatalogData::new(), Vec::new());
        }

        let catalog = self.store.load_catalog_or_empty();
        let known = self.store.load_authors_or_empty();
        tracing::info!(
            "Loaded {} resolved authors and {} known authors",
            catalog.len(),
            known.len()
        );
        (catalog, known)
    }

    /// The frontier a run would start with, without crawling
    pub fn planned_seed(&self) -> Vec<AuthorId> {
        let (data, known) = self.load_state();
        let catalog = Catalog::from_data(data);
        seed_frontier(&known, &catalog, &self.config.crawler.root_author)
    }

    /// Runs the crawl to convergence and persists the results
    ///
    /// Persistence failures are logged and reflected in the report rather
    /// than returned, so the in-memory catalog is still available to the
    /// caller.
    pub async fn run(&self) -> CrawlReport {
        let start_time = Instant::now();

        let (data, known) = self.load_state();
        let catalog = Arc::new(Catalog::from_data(data));
        let blacklist = Arc::new(Blacklist::new());
        let error_log = Arc::new(ErrorLog::new(&self.config.output.error_log_path));

        let seed = seed_frontier(&known, &catalog, &self.config.crawler.root_author);
        tracing::info!(
            "Starting crawl from {} seed authors with {} workers",
            seed.len(),
            self.config.crawler.workers
        );

        let scanner = Arc::new(AuthorScanner::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&catalog),
            Arc::clone(&blacklist),
            error_log,
        ));
        let mut scheduler = Scheduler::new(
            &self.config.crawler,
            scanner,
            Arc::clone(&catalog),
            Arc::clone(&blacklist),
            Arc::clone(&self.progress),
            seed,
        );

        let summary = scheduler.run().await;
        self.progress.finish();

        let data = catalog.snapshot();
        let (catalog_saved, authors_saved) = self.persist(&data);

        let report = CrawlReport {
            resolved: data.len(),
            blacklisted: blacklist.snapshot(),
            requeued: summary.requeued,
            abandoned: summary.abandoned,
            submitted: summary.submitted,
            books: data.values().map(|shelf| shelf.len()).sum(),
            catalog_saved,
            authors_saved,
            duration: start_time.elapsed(),
            catalog: data,
        };

        tracing::info!(
            "Crawl completed: {} authors, {} books in {:?}",
            report.resolved,
            report.books,
            report.duration
        );

        report
    }

    fn persist(&self, data: &CatalogData) -> (bool, bool) {
        let catalog_saved = match self.store.save_catalog(data) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to save catalog: {}", e);
                false
            }
        };

        let authors: Vec<AuthorId> = data.keys().cloned().collect();
        let authors_saved = match self.store.save_authors(&authors) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to save author list: {}", e);
                false
            }
        };

        (catalog_saved, authors_saved)
    }
}

/// Builds the initial frontier
///
/// Known authors not yet resolved come first, in stored order, followed by
/// the root author when it is not resolved either.
pub fn seed_frontier(known: &[AuthorId], catalog: &Catalog, root: &str) -> Vec<AuthorId> {
    let mut seed: Vec<AuthorId> = known
        .iter()
        .filter(|author| !catalog.contains(author))
        .cloned()
        .collect();

    if !catalog.contains(root) && !seed.iter().any(|author| author == root) {
        seed.push(root.to_string());
    }

    seed
}

/// Runs a complete crawl against the configured source
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Ignore stored state
/// * `progress` - Progress display, hidden for quiet runs
///
/// # Example
///
/// ```no_run
/// use bookcase::config::load_config;
/// use bookcase::crawler::{run_crawl, Progress};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("bookcase.toml"))?;
/// let report = run_crawl(config, false, Arc::new(Progress::new())).await?;
/// println!("{} books", report.books);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    fresh: bool,
    progress: Arc<Progress>,
) -> Result<CrawlReport, BookcaseError> {
    let fetcher = HttpFetcher::new(&config.source, config.crawler.request_timeout())?;
    let store = open_storage(&config.output.catalog_path, &config.output.authors_path);

    let coordinator =
        Coordinator::new(config, Arc::new(fetcher), Arc::new(store), progress).fresh(fresh);

    Ok(coordinator.run().await)
}
