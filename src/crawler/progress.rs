//! Process-wide crawl counters and the status line
//!
//! Counters are atomics so the scheduler and display can read them without
//! locking. When attached to a terminal an indicatif spinner shows the
//! overwriting `Scanning... (<resolved>/<in-flight>)` line.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Authors with a catalog entry
    pub resolved: usize,
    /// Scans submitted and not yet completed
    pub in_flight: usize,
    /// Scans submitted over the whole crawl
    pub submitted: usize,
    /// Scans that ended in a rejected profile
    pub blacklisted: usize,
    /// Scans that ended in an unexpected failure
    pub failed: usize,
    /// Authors put back on the frontier after finishing unresolved
    pub requeued: usize,
}

#[derive(Debug)]
pub struct Progress {
    resolved: AtomicUsize,
    in_flight: AtomicUsize,
    submitted: AtomicUsize,
    blacklisted: AtomicUsize,
    failed: AtomicUsize,
    requeued: AtomicUsize,
    bar: ProgressBar,
}

impl Progress {
    /// Progress with a spinner drawn to stderr
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        Self::with_bar(bar)
    }

    /// Progress that only counts
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            resolved: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            submitted: AtomicUsize::new(0),
            blacklisted: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            requeued: AtomicUsize::new(0),
            bar,
        }
    }

    pub fn set_resolved(&self, resolved: usize) {
        self.resolved.store(resolved, Ordering::Relaxed);
        self.refresh();
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        self.refresh();
    }

    /// A submitted scan finished, whatever its outcome
    pub fn record_completed(&self) {
        // Saturate instead of wrapping if a completion is reported twice.
        let _ = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        self.refresh();
    }

    pub fn record_blacklisted(&self) {
        self.blacklisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_requeued(&self, count: usize) {
        self.requeued.fetch_add(count, Ordering::Relaxed);
    }

    pub fn status_line(&self) -> String {
        format!(
            "Scanning... ({}/{})",
            self.resolved.load(Ordering::Relaxed),
            self.in_flight.load(Ordering::Relaxed)
        )
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            resolved: self.resolved.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            submitted: self.submitted.load(Ordering::Relaxed),
            blacklisted: self.blacklisted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            requeued: self.requeued.load(Ordering::Relaxed),
        }
    }

    /// Clears the status line
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn refresh(&self) {
        self.bar.set_message(self.status_line());
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::hidden()
    }
}
