use crate::AuthorId;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

/// Authors whose profile was rejected during this run
///
/// Shared between the scheduler and every scan task. Members are never
/// re-submitted automatically within a run.
#[derive(Debug, Default)]
pub struct Blacklist {
    authors: Mutex<BTreeSet<AuthorId>>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<AuthorId>> {
        self.authors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds an author. Returns false if it was already present.
    pub fn insert(&self, author: &str) -> bool {
        self.lock().insert(author.to_string())
    }

    pub fn contains(&self, author: &str) -> bool {
        self.lock().contains(author)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted copy of the current members
    pub fn snapshot(&self) -> BTreeSet<AuthorId> {
        self.lock().clone()
    }
}
