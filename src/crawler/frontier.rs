//! Crawl frontier
//!
//! The frontier is an append-only sequence of author ids with a cursor that
//! only moves forward. Nothing is ever removed, so the same author may appear
//! several times; deciding whether an entry is worth scanning is left to the
//! scheduler.

use crate::AuthorId;

#[derive(Debug, Default, Clone)]
pub struct Frontier {
    entries: Vec<AuthorId>,
    cursor: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed<I>(seed: I) -> Self
    where
        I: IntoIterator<Item = AuthorId>,
    {
        let mut frontier = Self::new();
        frontier.extend(seed);
        frontier
    }

    pub fn push(&mut self, author: AuthorId) {
        self.entries.push(author);
    }

    /// Appends every id, returning how many were appended
    pub fn extend<I>(&mut self, authors: I) -> usize
    where
        I: IntoIterator<Item = AuthorId>,
    {
        let before = self.entries.len();
        self.entries.extend(authors);
        self.entries.len() - before
    }

    /// True while unconsumed entries remain
    pub fn has_next(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Consumes the entry under the cursor
    pub fn next_author(&mut self) -> Option<AuthorId> {
        let author = self.entries.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(author)
    }

    /// Unconsumed entries, oldest first
    pub fn pending(&self) -> &[AuthorId] {
        &self.entries[self.cursor..]
    }

    pub fn is_pending(&self, author: &str) -> bool {
        self.pending().iter().any(|queued| queued == author)
    }

    /// Number of entries ever appended
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// How many times an id was appended over the frontier's lifetime
    pub fn occurrences(&self, author: &str) -> usize {
        self.entries.iter().filter(|queued| *queued == author).count()
    }
}
