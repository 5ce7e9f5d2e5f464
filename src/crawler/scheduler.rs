//! Crawl scheduler
//!
//! This module drives the frontier to convergence:
//! - Consumes the frontier and submits scans to a fixed-width worker pool
//! - Never submits an author that is in flight, blacklisted, or resolved
//! - Appends each completed scan's discoveries to the frontier
//! - Once every submitted scan has completed and the frontier is exhausted,
//!   re-queues authors that finished without resolving, or stops
//!
//! The scheduler is the only owner of the frontier and the in-flight set.
//! Workers report back through their task handles, which the scheduler awaits
//! as a single stream of completions instead of polling.

use crate::config::CrawlerConfig;
use crate::crawler::frontier::Frontier;
use crate::crawler::progress::Progress;
use crate::crawler::scanner::{AuthorScanner, ScanError, ScanOutcome};
use crate::state::{AuthorState, Blacklist};
use crate::storage::Catalog;
use crate::AuthorId;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// What the scheduler did over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    /// Scans submitted
    pub submitted: usize,

    /// Re-queue passes that found unresolved authors
    pub requeue_cycles: usize,

    /// Authors re-queued, summed over all passes
    pub requeued: usize,

    /// Authors given up on after exceeding the re-queue cap
    pub abandoned: BTreeSet<AuthorId>,
}

pub struct Scheduler {
    scanner: Arc<AuthorScanner>,
    catalog: Arc<Catalog>,
    blacklist: Arc<Blacklist>,
    progress: Arc<Progress>,

    /// Bounds how many scans run at once
    pool: Arc<Semaphore>,
    frontier: Frontier,

    /// Authors submitted and not yet found unresolved by a re-queue pass
    scanning: BTreeSet<AuthorId>,
    in_flight: FuturesUnordered<JoinHandle<ScanOutcome>>,

    requeues: HashMap<AuthorId, u32>,
    max_requeues: Option<u32>,
    summary: ScheduleSummary,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `config` - Worker pool width and re-queue cap
    /// * `scanner` - Scanner run for each submitted author
    /// * `catalog` - Shared catalog the scanner writes to
    /// * `blacklist` - Shared blacklist the scanner writes to
    /// * `progress` - Counters updated as scans complete
    /// * `seed` - Initial frontier contents
    pub fn new(
        config: &CrawlerConfig,
        scanner: Arc<AuthorScanner>,
        catalog: Arc<Catalog>,
        blacklist: Arc<Blacklist>,
        progress: Arc<Progress>,
        seed: Vec<AuthorId>,
    ) -> Self {
        Self {
            scanner,
            catalog,
            blacklist,
            progress,
            pool: Arc::new(Semaphore::new(config.workers.max(1) as usize)),
            frontier: Frontier::with_seed(seed),
            scanning: BTreeSet::new(),
            in_flight: FuturesUnordered::new(),
            requeues: HashMap::new(),
            max_requeues: config.max_requeues,
            summary: ScheduleSummary::default(),
        }
    }

    /// Runs until convergence
    ///
    /// Returns once the frontier is exhausted, no scan is outstanding and
    /// every submitted author is resolved, blacklisted or abandoned. Without a
    /// re-queue cap an author that keeps failing unexpectedly is retried
    /// forever.
    pub async fn run(&mut self) -> ScheduleSummary {
        self.progress.set_resolved(self.catalog.len());

        loop {
            self.drain_ready();

            if let Some(author) = self.frontier.next_author() {
                if self.should_submit(&author) {
                    self.submit(author);
                }
                continue;
            }

            // Frontier exhausted: wait for the next completion
            if let Some(joined) = self.in_flight.next().await {
                self.handle_completion(joined);
                continue;
            }

            // Every submitted scan has completed
            let unhandled = self.unhandled();
            if unhandled.is_empty() {
                break;
            }
            self.requeue(unhandled);
        }

        tracing::info!(
            "Crawl converged: {} resolved, {} blacklisted, {} scans submitted",
            self.catalog.len(),
            self.blacklist.len(),
            self.summary.submitted
        );

        self.summary.clone()
    }

    /// Where an author currently stands
    ///
    /// Resolution wins over any other bookkeeping. `None` means the author
    /// was never seen or was abandoned.
    pub fn state_of(&self, author: &str) -> Option<AuthorState> {
        if self.catalog.contains(author) {
            Some(AuthorState::Resolved)
        } else if self.blacklist.contains(author) {
            Some(AuthorState::Blacklisted)
        } else if self.scanning.contains(author) {
            Some(AuthorState::InFlight)
        } else if self.frontier.is_pending(author) {
            if self.requeues.contains_key(author) {
                Some(AuthorState::Requeued)
            } else {
                Some(AuthorState::Queued)
            }
        } else {
            None
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn scanning(&self) -> &BTreeSet<AuthorId> {
        &self.scanning
    }

    fn should_submit(&self, author: &str) -> bool {
        !self.scanning.contains(author)
            && !self.blacklist.contains(author)
            && !self.catalog.contains(author)
            && !self.summary.abandoned.contains(author)
    }

    fn submit(&mut self, author: AuthorId) {
        tracing::debug!(author = %author, "Submitting scan");
        self.scanning.insert(author.clone());
        self.summary.submitted += 1;
        self.progress.record_submitted();

        let scanner = Arc::clone(&self.scanner);
        let pool = Arc::clone(&self.pool);
        self.in_flight.push(tokio::spawn(async move {
            // The pool is never closed, so acquiring only fails after shutdown.
            let _permit = pool.acquire_owned().await.ok();
            scanner.scan(&author).await
        }));
    }

    /// Handles completions that are already available without waiting
    fn drain_ready(&mut self) {
        while let Some(Some(joined)) = self.in_flight.next().now_or_never() {
            self.handle_completion(joined);
        }
    }

    fn handle_completion(&mut self, joined: Result<ScanOutcome, JoinError>) {
        self.progress.record_completed();

        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                // The author stays in `scanning` unresolved and is picked up
                // by the next re-queue pass.
                tracing::error!("Scan task did not complete: {}", e);
                return;
            }
        };

        match &outcome.result {
            Ok(_) => self.progress.set_resolved(self.catalog.len()),
            Err(ScanError::Rejected { .. }) => self.progress.record_blacklisted(),
            Err(ScanError::Unexpected { .. }) => self.progress.record_failed(),
        }

        let appended = self.frontier.extend(outcome.discovered);
        if appended > 0 {
            tracing::trace!(author = %outcome.author, appended, "Frontier extended");
        }
    }

    /// Submitted authors that are neither resolved nor blacklisted
    fn unhandled(&self) -> BTreeSet<AuthorId> {
        self.scanning
            .iter()
            .filter(|author| !self.catalog.contains(author) && !self.blacklist.contains(author))
            .cloned()
            .collect()
    }

    fn requeue(&mut self, unhandled: BTreeSet<AuthorId>) {
        self.summary.requeue_cycles += 1;
        let mut requeued = 0;

        for author in unhandled {
            self.scanning.remove(&author);

            let attempts = self.requeues.entry(author.clone()).or_insert(0);
            *attempts += 1;

            if let Some(max) = self.max_requeues {
                if *attempts > max {
                    tracing::warn!(
                        author = %author,
                        "Giving up on author after {} re-queues",
                        max
                    );
                    self.summary.abandoned.insert(author);
                    continue;
                }
            }

            tracing::debug!(author = %author, attempt = *attempts, "Re-queuing unresolved author");
            self.frontier.push(author);
            requeued += 1;
        }

        if requeued > 0 {
            tracing::info!("Re-queued {} unresolved authors", requeued);
        }
        self.summary.requeued += requeued;
        self.progress.record_requeued(requeued);
    }
}
