//! Append-only scan error log
//!
//! Each record is a timestamp line followed by its context lines separated by
//! `--` lines. The crawler never reads the log back.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only sink for scan failures
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    // Serializes appends so records from concurrent scans never interleave.
    lock: Mutex<()>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record
    ///
    /// Write failures are reported through tracing and otherwise ignored; a
    /// broken log must not fail a scan.
    pub fn record<S: AsRef<str>>(&self, context: &[S]) {
        let entry = format_record(&Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(), context);

        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));

        if let Err(e) = result {
            tracing::warn!("Failed to append to error log {}: {}", self.path.display(), e);
        }
    }
}

fn format_record<S: AsRef<str>>(timestamp: &str, context: &[S]) -> String {
    let body = context
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join("\n--\n");
    format!("{}\n{}\n\n", timestamp, body)
}
